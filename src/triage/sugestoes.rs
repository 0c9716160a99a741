//! Sugestões de próximo follow-up a partir do contexto do chamado.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::chamados::types::{Chamado, CriticidadeChamado, FollowUp, StatusChamado, TipoFollowUp};

#[derive(Debug, Clone)]
pub struct ContextoChamado {
    pub tipos_existentes: Vec<TipoFollowUp>,
    pub tempo_desde_ultimo: Option<f64>,
    pub tempo_desde_criacao: f64,
    pub total_followups: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prioridade {
    #[serde(rename = "alta")]
    Alta,
    #[serde(rename = "media")]
    Media,
    #[serde(rename = "baixa")]
    Baixa,
}

#[derive(Debug, Clone)]
pub struct SugestaoFollowUps {
    pub sugestoes: Vec<String>,
    pub proximo_tipo: TipoFollowUp,
    pub prioridade: Prioridade,
}

pub fn analisar_contexto(
    chamado: &Chamado,
    followups: &[FollowUp],
    agora: NaiveDateTime,
) -> ContextoChamado {
    let tipos_existentes: Vec<TipoFollowUp> = followups.iter().map(|f| f.tipo).collect();

    let tempo_desde_ultimo = followups
        .iter()
        .map(|f| f.data_criacao)
        .max()
        .map(|ultimo| horas_entre(ultimo, agora));

    ContextoChamado {
        tipos_existentes,
        tempo_desde_ultimo,
        tempo_desde_criacao: horas_entre(chamado.data_criacao, agora),
        total_followups: followups.len(),
    }
}

fn horas_entre(inicio: NaiveDateTime, fim: NaiveDateTime) -> f64 {
    (fim - inicio).num_seconds() as f64 / 3600.0
}

/// Árvore de decisão sobre status, criticidade, idade e conteúdo do chamado.
pub fn gerar_sugestoes(chamado: &Chamado, contexto: &ContextoChamado) -> SugestaoFollowUps {
    let mut sugestoes: Vec<String> = Vec::new();
    let mut proximo_tipo = TipoFollowUp::Outros;
    let mut prioridade = Prioridade::Media;

    let descricao_lower = chamado.descricao.to_lowercase();
    let tem = |tipo: TipoFollowUp| contexto.tipos_existentes.contains(&tipo);
    let relata_defeito = ["erro", "bug", "falha", "problema"]
        .iter()
        .any(|p| descricao_lower.contains(p));

    match chamado.status {
        StatusChamado::Aberto => {
            if !tem(TipoFollowUp::Analise) {
                sugestoes.push("Realizar análise inicial do problema reportado".to_string());
                proximo_tipo = TipoFollowUp::Analise;
                prioridade = Prioridade::Alta;
            } else {
                sugestoes.push(
                    "Entrar em contato com o cliente para esclarecimentos adicionais".to_string(),
                );
                prioridade = Prioridade::Alta;
            }
        }
        StatusChamado::EmAnalise => {
            if !tem(TipoFollowUp::Analise) {
                sugestoes.push("Documentar análise técnica e achados preliminares".to_string());
                proximo_tipo = TipoFollowUp::Analise;
            } else if relata_defeito && !tem(TipoFollowUp::Desenvolvimento) {
                sugestoes.push("Planejar desenvolvimento da correção".to_string());
                proximo_tipo = TipoFollowUp::Desenvolvimento;
            } else if descricao_lower.contains("teste") || descricao_lower.contains("reproduz") {
                sugestoes.push("Executar testes para reproduzir o problema".to_string());
                proximo_tipo = TipoFollowUp::Analise;
            } else {
                sugestoes.push("Atualizar status da investigação em andamento".to_string());
            }
        }
        StatusChamado::Pendente => {
            if contexto.tempo_desde_ultimo.map_or(false, |h| h > 24.0) {
                sugestoes.push(
                    "Cobrar retorno do cliente - chamado pendente há mais de 24 horas".to_string(),
                );
                prioridade = Prioridade::Alta;
            } else {
                sugestoes.push("Acompanhar pendências em aberto".to_string());
            }
        }
        StatusChamado::Resolvido => {
            if !tem(TipoFollowUp::Publicacao) {
                sugestoes.push("Documentar a publicação da solução".to_string());
                proximo_tipo = TipoFollowUp::Publicacao;
            } else {
                sugestoes.push("Validar a solução com o cliente".to_string());
            }
        }
        StatusChamado::Fechado => {
            sugestoes.push("Registrar encerramento e lições aprendidas".to_string());
            prioridade = Prioridade::Baixa;
        }
    }

    match chamado.criticidade {
        CriticidadeChamado::Critica => {
            if chamado.status.em_aberto()
                && contexto.tempo_desde_ultimo.map_or(true, |h| h > 2.0)
            {
                sugestoes.insert(
                    0,
                    "URGENTE: Atualizar status - chamado crítico sem follow-up recente"
                        .to_string(),
                );
                prioridade = Prioridade::Alta;
            }
        }
        CriticidadeChamado::Alta => {
            if chamado.status.em_aberto()
                && contexto.tempo_desde_ultimo.map_or(true, |h| h > 8.0)
            {
                sugestoes.insert(
                    0,
                    "Priorizar atualização - chamado de alta criticidade".to_string(),
                );
                prioridade = Prioridade::Alta;
            }
        }
        _ => {}
    }

    if chamado.status.em_aberto() && contexto.tempo_desde_criacao > 72.0 {
        sugestoes.push(
            "Reavaliar criticidade e estratégia - chamado em aberto há mais de 3 dias".to_string(),
        );
    }

    if relata_defeito && !tem(TipoFollowUp::Analise) {
        sugestoes.push("Realizar análise técnica detalhada do erro reportado".to_string());
    }
    if ["integração", "api", "webservice"]
        .iter()
        .any(|p| descricao_lower.contains(p))
    {
        sugestoes.push("Verificar logs de integração e conectividade".to_string());
    }
    if ["performance", "lento", "demora"]
        .iter()
        .any(|p| descricao_lower.contains(p))
    {
        sugestoes.push("Executar análise de performance e benchmarks".to_string());
    }

    sugestoes.dedup();
    sugestoes.truncate(5);

    SugestaoFollowUps {
        sugestoes,
        proximo_tipo,
        prioridade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(dia: u32, hora: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, dia)
            .unwrap()
            .and_hms_opt(hora, 0, 0)
            .unwrap()
    }

    fn chamado(status: StatusChamado, criticidade: CriticidadeChamado, descricao: &str) -> Chamado {
        Chamado {
            id: 1,
            numero_wex: "WEX-001".to_string(),
            cliente_solicitante: "Empresa ABC".to_string(),
            descricao: descricao.to_string(),
            status,
            criticidade,
            data_criacao: ts(1, 9),
            data_atualizacao: ts(1, 9),
            sla_limite: None,
            tags_automaticas: vec![],
            score_qualidade: 50,
            ambiente_informado: false,
            possui_anexos: false,
        }
    }

    fn followup(tipo: TipoFollowUp, dia: u32, hora: u32) -> FollowUp {
        FollowUp {
            id: 1,
            chamado_id: 1,
            tipo,
            descricao: "registro".to_string(),
            data_criacao: ts(dia, hora),
            autor: "ana".to_string(),
            anexos: vec![],
        }
    }

    #[test]
    fn test_contexto_sem_followups() {
        let c = chamado(StatusChamado::Aberto, CriticidadeChamado::Media, "dúvida");
        let contexto = analisar_contexto(&c, &[], ts(1, 12));
        assert_eq!(contexto.total_followups, 0);
        assert_eq!(contexto.tempo_desde_ultimo, None);
        assert_eq!(contexto.tempo_desde_criacao, 3.0);
    }

    #[test]
    fn test_contexto_usa_followup_mais_recente() {
        let c = chamado(StatusChamado::Aberto, CriticidadeChamado::Media, "dúvida");
        let followups = vec![
            followup(TipoFollowUp::Analise, 1, 10),
            followup(TipoFollowUp::Outros, 1, 14),
        ];
        let contexto = analisar_contexto(&c, &followups, ts(1, 16));
        assert_eq!(contexto.tempo_desde_ultimo, Some(2.0));
    }

    #[test]
    fn test_aberto_sem_analise_sugere_analise_inicial() {
        let c = chamado(StatusChamado::Aberto, CriticidadeChamado::Media, "dúvida de uso");
        let contexto = analisar_contexto(&c, &[], ts(1, 10));
        let resultado = gerar_sugestoes(&c, &contexto);
        assert_eq!(resultado.proximo_tipo, TipoFollowUp::Analise);
        assert_eq!(resultado.prioridade, Prioridade::Alta);
        assert!(resultado.sugestoes[0].contains("análise inicial"));
    }

    #[test]
    fn test_em_analise_com_defeito_sugere_desenvolvimento() {
        let c = chamado(
            StatusChamado::EmAnalise,
            CriticidadeChamado::Media,
            "Falha na gravação de pedidos",
        );
        let followups = vec![followup(TipoFollowUp::Analise, 1, 10)];
        let contexto = analisar_contexto(&c, &followups, ts(1, 12));
        let resultado = gerar_sugestoes(&c, &contexto);
        assert_eq!(resultado.proximo_tipo, TipoFollowUp::Desenvolvimento);
    }

    #[test]
    fn test_resolvido_sem_publicacao() {
        let c = chamado(StatusChamado::Resolvido, CriticidadeChamado::Media, "ajuste");
        let contexto = analisar_contexto(&c, &[], ts(1, 12));
        let resultado = gerar_sugestoes(&c, &contexto);
        assert_eq!(resultado.proximo_tipo, TipoFollowUp::Publicacao);
    }

    #[test]
    fn test_critico_sem_followup_recente_vira_urgente() {
        let c = chamado(
            StatusChamado::EmAnalise,
            CriticidadeChamado::Critica,
            "Sistema parado",
        );
        let followups = vec![followup(TipoFollowUp::Analise, 1, 9)];
        let contexto = analisar_contexto(&c, &followups, ts(1, 15));
        let resultado = gerar_sugestoes(&c, &contexto);
        assert!(resultado.sugestoes[0].starts_with("URGENTE"));
        assert_eq!(resultado.prioridade, Prioridade::Alta);
    }

    #[test]
    fn test_pendente_ha_mais_de_24_horas() {
        let c = chamado(StatusChamado::Pendente, CriticidadeChamado::Media, "aguardando");
        let followups = vec![followup(TipoFollowUp::Outros, 1, 9)];
        let contexto = analisar_contexto(&c, &followups, ts(3, 9));
        let resultado = gerar_sugestoes(&c, &contexto);
        assert!(resultado
            .sugestoes
            .iter()
            .any(|s| s.contains("mais de 24 horas")));
    }

    #[test]
    fn test_chamado_antigo_sugere_reavaliacao() {
        let c = chamado(StatusChamado::Aberto, CriticidadeChamado::Baixa, "dúvida");
        let contexto = analisar_contexto(&c, &[], ts(5, 9));
        let resultado = gerar_sugestoes(&c, &contexto);
        assert!(resultado
            .sugestoes
            .iter()
            .any(|s| s.contains("mais de 3 dias")));
    }

    #[test]
    fn test_no_maximo_cinco_sugestoes() {
        let c = chamado(
            StatusChamado::Aberto,
            CriticidadeChamado::Critica,
            "Erro de performance lento na integração via api",
        );
        let contexto = analisar_contexto(&c, &[], ts(5, 9));
        let resultado = gerar_sugestoes(&c, &contexto);
        assert!(resultado.sugestoes.len() <= 5);
    }
}
