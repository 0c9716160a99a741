//! Relacionamento entre chamados por similaridade textual.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::chamados::types::Chamado;

static PALAVRA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w{3,}\b").unwrap());
static TERMO_TECNICO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-zA-Z]*\b|\b\w*\d+\w*\b").unwrap());
static CODIGO_ERRO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"erro\s*\d+|error\s*\d+|\d{3,5}").unwrap());
static MENSAGEM_ERRO: Lazy<Regex> = Lazy::new(|| Regex::new("\"([^\"]*)\"").unwrap());

const STOPWORDS: &[&str] = &[
    "o", "a", "os", "as", "um", "uma", "uns", "umas", "de", "do", "da", "dos", "das", "e", "ou",
    "mas", "se", "que", "com", "por", "para", "em", "no", "na", "nos", "nas", "é", "são", "foi",
    "foram", "ser", "estar", "tem", "ter", "não", "sim",
];

#[derive(Debug, Clone)]
pub struct FeaturesTexto {
    pub palavras_significativas: HashSet<String>,
    pub termos_tecnicos: HashSet<String>,
    pub codigos_erro: HashSet<String>,
    pub mensagens_erro: HashSet<String>,
}

pub fn extrair_features(texto: &str) -> FeaturesTexto {
    let texto_lower = texto.to_lowercase();

    let palavras_significativas = PALAVRA
        .find_iter(&texto_lower)
        .map(|m| m.as_str().to_string())
        .filter(|p| !STOPWORDS.contains(&p.as_str()))
        .collect();

    let termos_tecnicos = TERMO_TECNICO
        .find_iter(texto)
        .map(|m| m.as_str().to_string())
        .collect();

    let codigos_erro = CODIGO_ERRO
        .find_iter(&texto_lower)
        .map(|m| m.as_str().to_string())
        .collect();

    let mensagens_erro = MENSAGEM_ERRO
        .captures_iter(texto)
        .map(|c| c[1].to_string())
        .collect();

    FeaturesTexto {
        palavras_significativas,
        termos_tecnicos,
        codigos_erro,
        mensagens_erro,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoresSimilaridade {
    pub palavras: f64,
    pub termos_tecnicos: f64,
    pub codigos_erro: f64,
    pub mensagens_erro: f64,
    pub cliente: f64,
    pub criticidade: f64,
    pub score_final: f64,
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersecao = a.intersection(b).count() as f64;
    let uniao = a.union(b).count() as f64;
    if uniao == 0.0 {
        0.0
    } else {
        intersecao / uniao
    }
}

/// Combinação ponderada de sobreposição textual, termos técnicos, códigos e
/// mensagens de erro, cliente e criticidade.
pub fn calcular_similaridade(a: &Chamado, b: &Chamado) -> ScoresSimilaridade {
    let features_a = extrair_features(&a.descricao);
    let features_b = extrair_features(&b.descricao);

    let palavras = jaccard(
        &features_a.palavras_significativas,
        &features_b.palavras_significativas,
    );
    let termos_tecnicos = jaccard(&features_a.termos_tecnicos, &features_b.termos_tecnicos);
    let codigos_erro = if features_a
        .codigos_erro
        .intersection(&features_b.codigos_erro)
        .next()
        .is_some()
    {
        1.0
    } else {
        0.0
    };
    let mensagens_erro = if features_a
        .mensagens_erro
        .intersection(&features_b.mensagens_erro)
        .next()
        .is_some()
    {
        1.0
    } else {
        0.0
    };
    let cliente = if a.cliente_solicitante.to_lowercase() == b.cliente_solicitante.to_lowercase() {
        1.0
    } else {
        0.0
    };
    let criticidade = if a.criticidade == b.criticidade { 1.0 } else { 0.0 };

    let score_final = palavras * 0.3
        + termos_tecnicos * 0.2
        + codigos_erro * 0.2
        + mensagens_erro * 0.15
        + cliente * 0.1
        + criticidade * 0.05;

    ScoresSimilaridade {
        palavras,
        termos_tecnicos,
        codigos_erro,
        mensagens_erro,
        cliente,
        criticidade,
        score_final,
    }
}

pub fn montar_motivos(scores: &ScoresSimilaridade) -> Vec<String> {
    let mut motivos = Vec::new();
    if scores.palavras > 0.3 {
        motivos.push("Termos similares na descrição".to_string());
    }
    if scores.termos_tecnicos > 0.5 {
        motivos.push("Termos técnicos em comum".to_string());
    }
    if scores.codigos_erro > 0.0 {
        motivos.push("Mesmo código de erro".to_string());
    }
    if scores.mensagens_erro > 0.0 {
        motivos.push("Mensagens de erro idênticas".to_string());
    }
    if scores.cliente > 0.0 {
        motivos.push("Mesmo cliente".to_string());
    }
    if scores.criticidade > 0.0 {
        motivos.push("Mesma criticidade".to_string());
    }
    motivos
}

/// Padrões comuns num grupo de chamados similares.
pub fn identificar_padroes(grupo: &[Chamado]) -> Vec<String> {
    let mut padroes = Vec::new();
    if grupo.len() < 2 {
        return padroes;
    }

    let mut por_cliente: HashMap<&str, usize> = HashMap::new();
    for chamado in grupo {
        *por_cliente.entry(chamado.cliente_solicitante.as_str()).or_insert(0) += 1;
    }
    if let Some((cliente, total)) = mais_comum(&por_cliente) {
        if total > 1 {
            padroes.push(format!("Múltiplos chamados do cliente: {cliente}"));
        }
    }

    let mut por_criticidade: HashMap<&str, usize> = HashMap::new();
    for chamado in grupo {
        *por_criticidade.entry(chamado.criticidade.as_str()).or_insert(0) += 1;
    }
    if let Some((criticidade, total)) = mais_comum(&por_criticidade) {
        if total as f64 / grupo.len() as f64 > 0.6 {
            padroes.push(format!("Padrão de criticidade: {criticidade}"));
        }
    }

    if grupo.len() >= 3 {
        let mut datas: Vec<_> = grupo.iter().map(|c| c.data_criacao).collect();
        datas.sort();
        let intervalo = (*datas.last().unwrap() - datas[0]).num_days();
        if intervalo <= 7 {
            padroes.push("Chamados concentrados em período de 7 dias".to_string());
        } else if intervalo <= 30 {
            padroes.push("Chamados concentrados em período de 30 dias".to_string());
        }
    }

    let mut termos: HashMap<String, usize> = HashMap::new();
    let mut erros: HashMap<String, usize> = HashMap::new();
    for chamado in grupo {
        let features = extrair_features(&chamado.descricao);
        for termo in features.termos_tecnicos {
            *termos.entry(termo).or_insert(0) += 1;
        }
        for erro in features.codigos_erro {
            *erros.entry(erro).or_insert(0) += 1;
        }
    }

    let recorrentes = recorrentes_ordenados(&termos);
    if !recorrentes.is_empty() {
        let amostra: Vec<&str> = recorrentes.iter().take(3).map(|s| s.as_str()).collect();
        padroes.push(format!("Termos técnicos recorrentes: {}", amostra.join(", ")));
    }

    let erros_recorrentes = recorrentes_ordenados(&erros);
    if !erros_recorrentes.is_empty() {
        padroes.push(format!(
            "Códigos de erro recorrentes: {}",
            erros_recorrentes.join(", ")
        ));
    }

    padroes
}

fn mais_comum<'a>(contagem: &HashMap<&'a str, usize>) -> Option<(&'a str, usize)> {
    contagem
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(chave, total)| (*chave, *total))
}

fn recorrentes_ordenados(contagem: &HashMap<String, usize>) -> Vec<String> {
    let mut itens: Vec<(&String, &usize)> =
        contagem.iter().filter(|(_, total)| **total > 1).collect();
    itens.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    itens.into_iter().map(|(chave, _)| chave.clone()).collect()
}

/// Agrupamento guloso por similaridade: cada chamado ainda livre abre um
/// grupo e arrasta os que passam do limiar. Só grupos com mais de um
/// chamado entram no resultado.
pub fn agrupar_similares(chamados: &[Chamado], limiar: f64) -> Vec<Vec<Chamado>> {
    let mut grupos = Vec::new();
    let mut processados: HashSet<i64> = HashSet::new();

    for base in chamados {
        if processados.contains(&base.id) {
            continue;
        }
        processados.insert(base.id);
        let mut grupo = vec![base.clone()];

        for candidato in chamados {
            if processados.contains(&candidato.id) {
                continue;
            }
            if calcular_similaridade(base, candidato).score_final > limiar {
                processados.insert(candidato.id);
                grupo.push(candidato.clone());
            }
        }

        if grupo.len() > 1 {
            grupos.push(grupo);
        }
    }

    grupos
}

/// Chamados resolvidos com vocabulário em comum com o principal, para
/// sugerir follow-ups a partir do histórico. Exige pelo menos duas palavras
/// significativas compartilhadas.
pub fn resolvidos_similares(
    principal: &Chamado,
    todos: &[Chamado],
    limite: usize,
) -> Vec<(i64, f64, Vec<String>)> {
    let palavras_principal = extrair_features(&principal.descricao).palavras_significativas;

    let mut candidatos: Vec<(i64, f64, Vec<String>)> = todos
        .iter()
        .filter(|c| c.id != principal.id && c.status == crate::chamados::types::StatusChamado::Resolvido)
        .filter_map(|c| {
            let palavras = extrair_features(&c.descricao).palavras_significativas;
            let comuns: Vec<String> = palavras_principal
                .intersection(&palavras)
                .cloned()
                .collect();
            if comuns.len() < 2 {
                return None;
            }
            let uniao = palavras_principal.union(&palavras).count() as f64;
            let mut comuns = comuns;
            comuns.sort();
            Some((c.id, comuns.len() as f64 / uniao, comuns))
        })
        .collect();

    candidatos.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
    candidatos.truncate(limite);
    candidatos
}

/// Resumo de descrição limitado a 200 caracteres para listagens.
pub fn resumir_descricao(descricao: &str) -> String {
    if descricao.chars().count() <= 200 {
        descricao.to_string()
    } else {
        let resumo: String = descricao.chars().take(200).collect();
        format!("{resumo}...")
    }
}
