//! Carga de demonstração: um conjunto determinístico de chamados e
//! follow-ups para rodar o front-end sem base externa.

use chrono::{Duration, NaiveDateTime};

use crate::chamados::storage::ChamadoStore;
use crate::chamados::types::{
    ChamadoCreate, ChamadoUpdate, CriticidadeChamado, FollowUpCreate, StatusChamado, TipoFollowUp,
};
use crate::chamados::ChamadosError;

struct DemoFollowUp {
    tipo: TipoFollowUp,
    descricao: &'static str,
    autor: &'static str,
    horas_apos_criacao: i64,
}

struct DemoChamado {
    numero_wex: &'static str,
    cliente: &'static str,
    descricao: &'static str,
    status: StatusChamado,
    criticidade: CriticidadeChamado,
    idade_horas: i64,
    sla_em_horas: Option<i64>,
    tags: &'static [&'static str],
    score_qualidade: i32,
    ambiente_informado: bool,
    possui_anexos: bool,
    followups: &'static [DemoFollowUp],
}

const DEMO: &[DemoChamado] = &[
    DemoChamado {
        numero_wex: "WEX-2025-001",
        cliente: "Empresa ABC Tecnologia Ltda",
        descricao: "Sistema fora do ar em produção, usuários sem acesso ao módulo de vendas. \
                    Erro 500 em todas as telas.",
        status: StatusChamado::EmAnalise,
        criticidade: CriticidadeChamado::Critica,
        idade_horas: 6,
        sla_em_horas: Some(-2),
        tags: &["acesso", "erro"],
        score_qualidade: 75,
        ambiente_informado: true,
        possui_anexos: true,
        followups: &[
            DemoFollowUp {
                tipo: TipoFollowUp::Analise,
                descricao: "Análise inicial: falha no balanceador após o deploy da manhã.",
                autor: "Carlos Mendes",
                horas_apos_criacao: 1,
            },
            DemoFollowUp {
                tipo: TipoFollowUp::Outros,
                descricao: "Cliente informado sobre o andamento; monitorando a recuperação.",
                autor: "Ana Souza",
                horas_apos_criacao: 3,
            },
        ],
    },
    DemoChamado {
        numero_wex: "WEX-2025-002",
        cliente: "XYZ Corporation Brasil",
        descricao: "Dashboard gerencial lento, consultas com timeout após 30 segundos. \
                    Problema intermitente desde a última atualização.",
        status: StatusChamado::Aberto,
        criticidade: CriticidadeChamado::Alta,
        idade_horas: 30,
        sla_em_horas: Some(18),
        tags: &["performance", "relatórios"],
        score_qualidade: 68,
        ambiente_informado: false,
        possui_anexos: false,
        followups: &[],
    },
    DemoChamado {
        numero_wex: "WEX-2025-003",
        cliente: "Inovação Digital S.A.",
        descricao: "Erro 403 ao acessar relatório de faturamento. Passos para reproduzir: \
                    login como gestor, menu relatórios, faturamento mensal.",
        status: StatusChamado::Resolvido,
        criticidade: CriticidadeChamado::Media,
        idade_horas: 96,
        sla_em_horas: None,
        tags: &["acesso", "relatórios", "permissões"],
        score_qualidade: 88,
        ambiente_informado: true,
        possui_anexos: true,
        followups: &[
            DemoFollowUp {
                tipo: TipoFollowUp::Analise,
                descricao: "Perfil do gestor estava sem a permissão de faturamento.",
                autor: "Carlos Mendes",
                horas_apos_criacao: 4,
            },
            DemoFollowUp {
                tipo: TipoFollowUp::Desenvolvimento,
                descricao: "Correção do provisionamento de perfis aplicada em homologação.",
                autor: "Paula Lima",
                horas_apos_criacao: 20,
            },
            DemoFollowUp {
                tipo: TipoFollowUp::Publicacao,
                descricao: "Correção publicada em produção e validada com o cliente.",
                autor: "Paula Lima",
                horas_apos_criacao: 44,
            },
        ],
    },
    DemoChamado {
        numero_wex: "WEX-2025-004",
        cliente: "TechSolutions Consulting",
        descricao: "Problema de integração com API externa - dados não sincronizando há dois dias.",
        status: StatusChamado::Pendente,
        criticidade: CriticidadeChamado::Alta,
        idade_horas: 72,
        sla_em_horas: Some(-24),
        tags: &["integração", "api"],
        score_qualidade: 55,
        ambiente_informado: false,
        possui_anexos: false,
        followups: &[DemoFollowUp {
            tipo: TipoFollowUp::Analise,
            descricao: "Aguardando credenciais atualizadas do fornecedor da API.",
            autor: "Ana Souza",
            horas_apos_criacao: 8,
        }],
    },
    DemoChamado {
        numero_wex: "WEX-2025-005",
        cliente: "DataFlow Systems",
        descricao: "Gostaria de uma melhoria no gráfico de vendas: exportação em PDF e \
                    filtros por região numa versão futura.",
        status: StatusChamado::Aberto,
        criticidade: CriticidadeChamado::Baixa,
        idade_horas: 50,
        sla_em_horas: None,
        tags: &["relatórios"],
        score_qualidade: 62,
        ambiente_informado: false,
        possui_anexos: false,
        followups: &[],
    },
    DemoChamado {
        numero_wex: "WEX-2025-006",
        cliente: "CloudFirst Technologies",
        descricao: "Falha na gravação de pedidos - dados não salvos, mensagem \"constraint violation\" \
                    no log. Erro reproduzível em ambiente de produção.",
        status: StatusChamado::EmAnalise,
        criticidade: CriticidadeChamado::Critica,
        idade_horas: 10,
        sla_em_horas: Some(4),
        tags: &["banco-dados", "erro"],
        score_qualidade: 82,
        ambiente_informado: true,
        possui_anexos: true,
        followups: &[DemoFollowUp {
            tipo: TipoFollowUp::Analise,
            descricao: "Constraint nova da migração 42 conflita com pedidos legados.",
            autor: "Paula Lima",
            horas_apos_criacao: 2,
        }],
    },
    DemoChamado {
        numero_wex: "WEX-2025-007",
        cliente: "NextGen Software",
        descricao: "Dúvida sobre configuração de permissões de usuário para o novo perfil de auditor.",
        status: StatusChamado::Fechado,
        criticidade: CriticidadeChamado::Baixa,
        idade_horas: 200,
        sla_em_horas: None,
        tags: &["permissões"],
        score_qualidade: 45,
        ambiente_informado: false,
        possui_anexos: false,
        followups: &[DemoFollowUp {
            tipo: TipoFollowUp::Outros,
            descricao: "Orientação enviada por e-mail com o passo a passo.",
            autor: "Ana Souza",
            horas_apos_criacao: 30,
        }],
    },
    DemoChamado {
        numero_wex: "WEX-2025-008",
        cliente: "Empresa ABC Tecnologia Ltda",
        descricao: "Erro 500 ao gerar relatório de vendas consolidado. Mensagem \"timeout exceeded\" \
                    após dois minutos.",
        status: StatusChamado::Resolvido,
        criticidade: CriticidadeChamado::Alta,
        idade_horas: 160,
        sla_em_horas: None,
        tags: &["relatórios", "performance"],
        score_qualidade: 80,
        ambiente_informado: true,
        possui_anexos: false,
        followups: &[
            DemoFollowUp {
                tipo: TipoFollowUp::Analise,
                descricao: "Consulta sem índice na tabela de itens; plano de execução anexado.",
                autor: "Carlos Mendes",
                horas_apos_criacao: 12,
            },
            DemoFollowUp {
                tipo: TipoFollowUp::Publicacao,
                descricao: "Índice criado em produção; geração voltou a responder em segundos.",
                autor: "Carlos Mendes",
                horas_apos_criacao: 40,
            },
        ],
    },
    DemoChamado {
        numero_wex: "WEX-2025-009",
        cliente: "SmartSystems Brasil",
        descricao: "App android não carrega a tela de login, fica travado na splash screen.",
        status: StatusChamado::Aberto,
        criticidade: CriticidadeChamado::Media,
        idade_horas: 2,
        sla_em_horas: Some(46),
        tags: &["mobile", "acesso"],
        score_qualidade: 58,
        ambiente_informado: false,
        possui_anexos: true,
        followups: &[],
    },
    DemoChamado {
        numero_wex: "WEX-2025-010",
        cliente: "GlobalData Analytics",
        descricao: "Solicitação de relatório personalizado de consumo por centro de custo.",
        status: StatusChamado::Pendente,
        criticidade: CriticidadeChamado::Baixa,
        idade_horas: 120,
        sla_em_horas: Some(120),
        tags: &["relatórios"],
        score_qualidade: 70,
        ambiente_informado: false,
        possui_anexos: false,
        followups: &[DemoFollowUp {
            tipo: TipoFollowUp::Outros,
            descricao: "Aguardando aprovação de escopo pelo solicitante.",
            autor: "Ana Souza",
            horas_apos_criacao: 48,
        }],
    },
];

/// Popula o store com o conjunto de demonstração, ancorado em `agora`.
/// Retorna o total de chamados criados.
pub async fn carregar_dados_demo(
    store: &ChamadoStore,
    agora: NaiveDateTime,
) -> Result<usize, ChamadosError> {
    for demo in DEMO {
        let criacao = agora - Duration::hours(demo.idade_horas);
        let criado = store
            .criar_chamado(
                ChamadoCreate {
                    numero_wex: demo.numero_wex.to_string(),
                    cliente_solicitante: demo.cliente.to_string(),
                    descricao: demo.descricao.to_string(),
                    status: StatusChamado::Aberto,
                    criticidade: demo.criticidade,
                    sla_limite: demo.sla_em_horas.map(|h| agora + Duration::hours(h)),
                    tags_automaticas: demo.tags.iter().map(|t| t.to_string()).collect(),
                    score_qualidade: demo.score_qualidade,
                    ambiente_informado: demo.ambiente_informado,
                    possui_anexos: demo.possui_anexos,
                },
                criacao,
            )
            .await?;

        for followup in demo.followups {
            store
                .criar_followup(
                    criado.chamado.id,
                    FollowUpCreate {
                        tipo: followup.tipo,
                        descricao: followup.descricao.to_string(),
                        autor: followup.autor.to_string(),
                        anexos: vec![],
                    },
                    criacao + Duration::hours(followup.horas_apos_criacao),
                )
                .await?;
        }

        if demo.status != StatusChamado::Aberto {
            let ultima_atividade = demo
                .followups
                .iter()
                .map(|f| f.horas_apos_criacao)
                .max()
                .unwrap_or(0);
            store
                .atualizar_chamado(
                    criado.chamado.id,
                    ChamadoUpdate {
                        status: Some(demo.status),
                        ..Default::default()
                    },
                    criacao + Duration::hours(ultima_atividade + 1),
                )
                .await?;
        }
    }

    Ok(DEMO.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chamados::types::ChamadoFiltros;
    use crate::dashboard::calcular_metricas;
    use chrono::NaiveDate;

    fn agora() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 8)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_carga_completa() {
        let store = ChamadoStore::new();
        let total = carregar_dados_demo(&store, agora()).await.unwrap();
        assert_eq!(total, DEMO.len());

        let lista = store
            .listar_chamados(ChamadoFiltros {
                limit: 100,
                ..Default::default()
            })
            .await;
        assert_eq!(lista.total, DEMO.len());
    }

    #[tokio::test]
    async fn test_carga_e_idempotencia_de_numero() {
        let store = ChamadoStore::new();
        carregar_dados_demo(&store, agora()).await.unwrap();
        // recarregar conflita com os números já emitidos
        assert!(carregar_dados_demo(&store, agora()).await.is_err());
    }

    #[tokio::test]
    async fn test_carga_alimenta_o_dashboard() {
        let store = ChamadoStore::new();
        carregar_dados_demo(&store, agora()).await.unwrap();

        let metricas = calcular_metricas(&store.snapshot().await, agora());
        let soma: i64 = metricas.total_chamados_por_status.values().sum();
        assert_eq!(soma, DEMO.len() as i64);
        assert!(metricas.chamados_criticos_abertos >= 2);
        assert!(metricas.chamados_vencidos >= 2);
        assert!(metricas.tempo_medio_resolucao.is_some());
    }

    #[tokio::test]
    async fn test_followups_da_carga() {
        let store = ChamadoStore::new();
        carregar_dados_demo(&store, agora()).await.unwrap();

        let followups = store.listar_followups(3).await.unwrap();
        assert_eq!(followups.len(), 3);
        assert!(followups.windows(2).all(|w| w[0].data_criacao <= w[1].data_criacao));
    }
}
