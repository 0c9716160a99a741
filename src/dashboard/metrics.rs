//! Agregação das métricas do dashboard sobre um snapshot do store.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::chamados::types::{Chamado, CriticidadeChamado, StatusChamado};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetricas {
    pub total_chamados_por_status: BTreeMap<String, i64>,
    pub chamados_criticos_abertos: i64,
    pub tempo_medio_resolucao: Option<f64>,
    pub distribuicao_por_criticidade: BTreeMap<String, i64>,
    pub chamados_novos_hoje: i64,
    pub chamados_vencidos: i64,
}

/// Função pura sobre o snapshot e um instante explícito. "Hoje" é o dia
/// calendário UTC de `agora`.
pub fn calcular_metricas(chamados: &[Chamado], agora: NaiveDateTime) -> DashboardMetricas {
    let mut por_status: BTreeMap<String, i64> = StatusChamado::TODOS
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let mut por_criticidade: BTreeMap<String, i64> = CriticidadeChamado::TODAS
        .iter()
        .map(|c| (c.as_str().to_string(), 0))
        .collect();

    let mut criticos_abertos = 0;
    let mut novos_hoje = 0;
    let mut vencidos = 0;
    let mut horas_resolucao: Vec<f64> = Vec::new();

    let hoje = agora.date();

    for chamado in chamados {
        *por_status.entry(chamado.status.as_str().to_string()).or_insert(0) += 1;
        *por_criticidade
            .entry(chamado.criticidade.as_str().to_string())
            .or_insert(0) += 1;

        if chamado.criticidade == CriticidadeChamado::Critica && chamado.status.em_aberto() {
            criticos_abertos += 1;
        }

        if chamado.data_criacao.date() == hoje {
            novos_hoje += 1;
        }

        if let Some(sla) = chamado.sla_limite {
            if sla < agora && chamado.status.em_aberto() {
                vencidos += 1;
            }
        }

        if chamado.status.finalizado() {
            let duracao = chamado.data_atualizacao - chamado.data_criacao;
            horas_resolucao.push(duracao.num_seconds() as f64 / 3600.0);
        }
    }

    let tempo_medio_resolucao = if horas_resolucao.is_empty() {
        None
    } else {
        Some(horas_resolucao.iter().sum::<f64>() / horas_resolucao.len() as f64)
    };

    DashboardMetricas {
        total_chamados_por_status: por_status,
        chamados_criticos_abertos: criticos_abertos,
        tempo_medio_resolucao,
        distribuicao_por_criticidade: por_criticidade,
        chamados_novos_hoje: novos_hoje,
        chamados_vencidos: vencidos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(dia: u32, hora: u32, minuto: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, dia)
            .unwrap()
            .and_hms_opt(hora, minuto, 0)
            .unwrap()
    }

    fn chamado_base(id: i64, status: StatusChamado, criticidade: CriticidadeChamado) -> Chamado {
        Chamado {
            id,
            numero_wex: format!("WEX-{id:03}"),
            cliente_solicitante: "Empresa ABC".to_string(),
            descricao: "Erro no sistema".to_string(),
            status,
            criticidade,
            data_criacao: ts(6, 14, 30),
            data_atualizacao: ts(6, 14, 30),
            sla_limite: None,
            tags_automaticas: vec![],
            score_qualidade: 50,
            ambiente_informado: false,
            possui_anexos: false,
        }
    }

    #[test]
    fn test_mapas_sempre_com_todos_os_valores() {
        let metricas = calcular_metricas(&[], ts(6, 12, 0));
        assert_eq!(metricas.total_chamados_por_status.len(), 5);
        assert!(metricas
            .total_chamados_por_status
            .values()
            .all(|&v| v == 0));
        assert_eq!(metricas.distribuicao_por_criticidade.len(), 4);
        assert_eq!(metricas.tempo_medio_resolucao, None);
    }

    #[test]
    fn test_contagens_por_status_somam_o_total() {
        let chamados = vec![
            chamado_base(1, StatusChamado::Aberto, CriticidadeChamado::Baixa),
            chamado_base(2, StatusChamado::Aberto, CriticidadeChamado::Alta),
            chamado_base(3, StatusChamado::Pendente, CriticidadeChamado::Media),
            chamado_base(4, StatusChamado::Fechado, CriticidadeChamado::Critica),
        ];
        let metricas = calcular_metricas(&chamados, ts(7, 12, 0));
        let soma: i64 = metricas.total_chamados_por_status.values().sum();
        assert_eq!(soma, chamados.len() as i64);
        assert_eq!(metricas.total_chamados_por_status["Aberto"], 2);
        assert_eq!(metricas.total_chamados_por_status["Em análise"], 0);
    }

    #[test]
    fn test_chamado_vencido() {
        let mut chamado = chamado_base(1, StatusChamado::Aberto, CriticidadeChamado::Alta);
        chamado.sla_limite = Some(ts(5, 0, 0));
        let metricas = calcular_metricas(&[chamado], ts(6, 12, 0));
        assert_eq!(metricas.chamados_vencidos, 1);
    }

    #[test]
    fn test_sla_vencido_de_resolvido_nao_conta() {
        let mut chamado = chamado_base(1, StatusChamado::Resolvido, CriticidadeChamado::Alta);
        chamado.sla_limite = Some(ts(5, 0, 0));
        let metricas = calcular_metricas(&[chamado], ts(6, 12, 0));
        assert_eq!(metricas.chamados_vencidos, 0);
    }

    #[test]
    fn test_tempo_medio_resolucao() {
        // criado 14:30, atualizado 16:30, Resolvido → 2.0 horas
        let mut resolvido = chamado_base(1, StatusChamado::Resolvido, CriticidadeChamado::Media);
        resolvido.data_criacao = ts(6, 14, 30);
        resolvido.data_atualizacao = ts(6, 16, 30);

        let mut fechado = chamado_base(2, StatusChamado::Fechado, CriticidadeChamado::Media);
        fechado.data_criacao = ts(6, 10, 0);
        fechado.data_atualizacao = ts(6, 14, 0);

        let aberto = chamado_base(3, StatusChamado::Aberto, CriticidadeChamado::Media);

        let metricas = calcular_metricas(&[resolvido, fechado, aberto], ts(7, 12, 0));
        assert_eq!(metricas.tempo_medio_resolucao, Some(3.0));
    }

    #[test]
    fn test_criticos_abertos() {
        let chamados = vec![
            chamado_base(1, StatusChamado::Aberto, CriticidadeChamado::Critica),
            chamado_base(2, StatusChamado::EmAnalise, CriticidadeChamado::Critica),
            chamado_base(3, StatusChamado::Resolvido, CriticidadeChamado::Critica),
            chamado_base(4, StatusChamado::Aberto, CriticidadeChamado::Alta),
        ];
        let metricas = calcular_metricas(&chamados, ts(7, 12, 0));
        assert_eq!(metricas.chamados_criticos_abertos, 2);
    }

    #[test]
    fn test_novos_hoje_por_dia_calendario() {
        let mut ontem = chamado_base(1, StatusChamado::Aberto, CriticidadeChamado::Media);
        ontem.data_criacao = ts(5, 23, 59);
        let hoje = chamado_base(2, StatusChamado::Aberto, CriticidadeChamado::Media);
        let metricas = calcular_metricas(&[ontem, hoje], ts(6, 0, 5));
        assert_eq!(metricas.chamados_novos_hoje, 1);
    }
}
