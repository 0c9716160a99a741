//! Triagem automática: indicadores de criticidade, score de qualidade e
//! tags derivadas do conteúdo do chamado.

use chrono::{Datelike, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chamados::types::CriticidadeChamado;

const PALAVRAS_CRITICAS: &[&str] = &[
    "parado",
    "travado",
    "não funciona",
    "indisponível",
    "erro crítico",
    "sistema fora",
    "down",
    "crash",
    "quebrado",
    "não consegue",
    "urgente",
    "emergência",
    "produção parada",
    "impacto alto",
    "falha total",
    "sem acesso",
];

const PALAVRAS_ALTAS: &[&str] = &[
    "lento",
    "problema",
    "erro",
    "falha",
    "demora",
    "timeout",
    "performance",
    "não carrega",
    "instável",
    "intermitente",
    "dificuldade",
    "bloqueio",
    "limitação",
    "pendência",
];

const PALAVRAS_MEDIAS: &[&str] = &[
    "dúvida",
    "ajuda",
    "como",
    "orientação",
    "suporte",
    "configuração",
    "permissão",
    "acesso",
    "tutorial",
    "explicação",
    "procedimento",
];

const PALAVRAS_BAIXAS: &[&str] = &[
    "melhoria",
    "sugestão",
    "otimização",
    "enhancement",
    "feature",
    "gostaria",
    "poderia",
    "seria possível",
    "futuro",
    "versão",
    "atualização",
];

const AMBIENTES_CRITICOS: &[&str] = &["produção", "prod", "production", "prd"];

static CODIGO_ERRO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"erro\s*\d+|error\s*\d+|\d{3,4}\s*erro").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoresCriticidade {
    pub critica: f64,
    pub alta: f64,
    pub media: f64,
    pub baixa: f64,
}

#[derive(Debug, Clone)]
pub struct IndicadoresCriticidade {
    pub criticidade: CriticidadeChamado,
    pub confianca: f64,
    pub fatores: Vec<String>,
    pub scores: ScoresCriticidade,
}

fn contar_ocorrencias(texto: &str, palavras: &[&str]) -> f64 {
    palavras.iter().filter(|p| texto.contains(*p)).count() as f64
}

/// Classifica a criticidade sugerida a partir de palavras-chave ponderadas
/// e de fatores contextuais (horário, cliente prioritário, ambiente de
/// produção, código de erro explícito).
pub fn classificar_criticidade(
    descricao: &str,
    cliente: &str,
    agora: NaiveDateTime,
) -> IndicadoresCriticidade {
    let descricao_lower = descricao.to_lowercase();

    let mut critica = contar_ocorrencias(&descricao_lower, PALAVRAS_CRITICAS);
    let mut alta = contar_ocorrencias(&descricao_lower, PALAVRAS_ALTAS);
    let media = contar_ocorrencias(&descricao_lower, PALAVRAS_MEDIAS);
    let baixa = contar_ocorrencias(&descricao_lower, PALAVRAS_BAIXAS);

    let mut fatores = Vec::new();

    let fora_do_expediente =
        agora.hour() < 8 || agora.hour() > 18 || agora.weekday().num_days_from_monday() >= 5;
    if fora_do_expediente {
        fatores.push("Abertura fora do horário comercial".to_string());
        critica += 0.5;
    }

    let cliente_lower = cliente.to_lowercase();
    if cliente_lower.contains("vip") || cliente_lower.contains("premium") {
        fatores.push("Cliente prioritário identificado".to_string());
        alta += 1.0;
    }

    if AMBIENTES_CRITICOS.iter().any(|a| descricao_lower.contains(a)) {
        fatores.push("Ambiente de produção mencionado".to_string());
        critica += 1.0;
    }

    if CODIGO_ERRO.is_match(&descricao_lower) {
        fatores.push("Código de erro específico mencionado".to_string());
        alta += 0.5;
    }

    // empate resolve para o nível mais severo
    let candidatos = [
        (CriticidadeChamado::Critica, critica),
        (CriticidadeChamado::Alta, alta),
        (CriticidadeChamado::Media, media),
        (CriticidadeChamado::Baixa, baixa),
    ];
    let (criticidade, vencedor) = candidatos
        .iter()
        .fold(candidatos[0], |melhor, atual| {
            if atual.1 > melhor.1 {
                *atual
            } else {
                melhor
            }
        });

    let num_palavras = descricao.split_whitespace().count() as f64;
    let confianca = (vencedor / (num_palavras * 0.1).max(1.0)).min(1.0);

    IndicadoresCriticidade {
        criticidade,
        confianca,
        fatores,
        scores: ScoresCriticidade {
            critica,
            alta,
            media,
            baixa,
        },
    }
}

/// Score de qualidade da abertura do chamado, 0 a 100.
pub fn calcular_score_qualidade(descricao: &str) -> i32 {
    let descricao_lower = descricao.to_lowercase();
    let tamanho = descricao.chars().count();
    let mut score: i32 = 50;

    if tamanho > 50 {
        score += 15;
    }
    if tamanho > 200 {
        score += 10;
    }

    if ["passos", "steps", "procedimento", "reproduz"]
        .iter()
        .any(|p| descricao_lower.contains(p))
    {
        score += 15;
    }
    if ["erro", "error", "mensagem"]
        .iter()
        .any(|p| descricao_lower.contains(p))
    {
        score += 10;
    }
    if ["ambiente", "versão", "browser", "sistema"]
        .iter()
        .any(|p| descricao_lower.contains(p))
    {
        score += 10;
    }
    if ["anexo", "print", "imagem", "log"]
        .iter()
        .any(|p| descricao_lower.contains(p))
    {
        score += 10;
    }

    if tamanho < 20 {
        score -= 25;
    }
    if descricao_lower.contains("não funciona") && tamanho < 50 {
        score -= 15;
    }

    score.clamp(0, 100)
}

/// Tags derivadas do conteúdo, em ordem fixa de categoria.
pub fn sugerir_tags(descricao: &str) -> Vec<String> {
    let descricao_lower = descricao.to_lowercase();
    let categorias: &[(&str, &[&str])] = &[
        ("acesso", &["login", "acesso", "senha", "autenticação"]),
        ("relatórios", &["relatório", "dashboard", "gráfico", "dados"]),
        ("performance", &["lento", "performance", "demora", "timeout"]),
        ("integração", &["integração", "api", "webservice", "importação"]),
        ("mobile", &["mobile", "celular", "app", "android", "ios"]),
        ("web", &["browser", "chrome", "firefox", "internet"]),
        ("permissões", &["permissão", "perfil", "usuário", "grupo"]),
        ("banco-dados", &["banco", "database", "sql", "consulta"]),
    ];

    categorias
        .iter()
        .filter(|(_, palavras)| palavras.iter().any(|p| descricao_lower.contains(p)))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// Sugestões de melhoria da abertura quando o score fica abaixo de 70.
pub fn sugestoes_melhoria(descricao: &str, score: i32) -> Vec<String> {
    let mut sugestoes = Vec::new();
    if score >= 70 {
        return sugestoes;
    }

    let descricao_lower = descricao.to_lowercase();
    if descricao.chars().count() < 50 {
        sugestoes.push("Adicionar mais detalhes na descrição do problema".to_string());
    }
    if !descricao_lower.contains("erro") && !descricao_lower.contains("error") {
        sugestoes.push("Incluir mensagens de erro específicas, se houver".to_string());
    }
    if !descricao_lower.contains("ambiente") && !descricao_lower.contains("versão") {
        sugestoes.push("Informar ambiente e versão do sistema".to_string());
    }
    if !descricao_lower.contains("passos") && !descricao_lower.contains("procedimento") {
        sugestoes.push("Detalhar passos para reproduzir o problema".to_string());
    }
    sugestoes
}
