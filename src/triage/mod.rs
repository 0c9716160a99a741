pub mod classifier;
pub mod similaridade;
pub mod sugestoes;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::chamados::types::{
    Chamado, CriticidadeChamado, FollowUp, FollowUpCreate, StatusChamado, TipoFollowUp,
};
use crate::chamados::ChamadosError;
use crate::shared::state::AppState;

pub use classifier::{
    calcular_score_qualidade, classificar_criticidade, sugerir_tags, sugestoes_melhoria,
    IndicadoresCriticidade, ScoresCriticidade,
};
pub use similaridade::{
    agrupar_similares, calcular_similaridade, extrair_features, identificar_padroes,
    montar_motivos, resolvidos_similares, resumir_descricao, ScoresSimilaridade,
};
pub use sugestoes::{analisar_contexto, gerar_sugestoes, Prioridade, SugestaoFollowUps};

#[derive(Debug, Serialize)]
pub struct TriagemResponse {
    pub id_chamado: i64,
    pub criticidade_atual: CriticidadeChamado,
    pub criticidade_sugerida: CriticidadeChamado,
    pub confianca: f64,
    pub fatores_identificados: Vec<String>,
    pub sugestoes_adicao: Vec<String>,
    pub score_qualidade_atual: i32,
    pub score_qualidade_sugerido: i32,
    pub tags_atuais: Vec<String>,
    pub tags_sugeridas: Vec<String>,
    pub detalhes_scores: ScoresCriticidade,
}

#[derive(Debug, Serialize)]
pub struct MudancaCriticidade {
    pub anterior: CriticidadeChamado,
    pub nova: CriticidadeChamado,
}

#[derive(Debug, Serialize)]
pub struct MudancasTriagem {
    pub criticidade: MudancaCriticidade,
    pub score_qualidade: i32,
    pub tags_adicionadas: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AplicarTriagemResponse {
    pub success: bool,
    pub chamado_id: i64,
    pub mudancas: MudancasTriagem,
}

#[derive(Debug, Serialize)]
pub struct ContextoResponse {
    pub status_atual: StatusChamado,
    pub criticidade: CriticidadeChamado,
    pub tempo_desde_criacao_horas: f64,
    pub tempo_desde_ultimo_followup_horas: Option<f64>,
    pub total_followups_existentes: usize,
}

#[derive(Debug, Serialize)]
pub struct ExemploFollowUp {
    pub tipo: TipoFollowUp,
    pub descricao: String,
}

#[derive(Debug, Serialize)]
pub struct ExemploHistorico {
    pub chamado_similar_id: i64,
    pub score_similaridade: f64,
    pub palavras_comuns: Vec<String>,
    pub followups: Vec<ExemploFollowUp>,
}

#[derive(Debug, Serialize)]
pub struct SugestoesFollowUpResponse {
    pub id_chamado: i64,
    pub sugestoes_principais: Vec<String>,
    pub proximo_tipo_sugerido: TipoFollowUp,
    pub prioridade: Prioridade,
    pub contexto: ContextoResponse,
    pub exemplos_historico: Vec<ExemploHistorico>,
    pub tipos_followup_existentes: Vec<TipoFollowUp>,
}

#[derive(Debug, Deserialize)]
pub struct FollowUpSugeridoRequest {
    pub sugestao_index: usize,
    pub autor: String,
}

#[derive(Debug, Serialize)]
pub struct FollowUpSugeridoResponse {
    pub success: bool,
    pub followup_criado: FollowUp,
}

#[derive(Debug, Deserialize)]
pub struct RelacionadosQuery {
    pub limite: Option<usize>,
    pub score_minimo: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ResumoChamado {
    pub numero_wex: String,
    pub cliente: String,
    pub descricao: String,
    pub status: StatusChamado,
    pub criticidade: CriticidadeChamado,
}

#[derive(Debug, Serialize)]
pub struct ChamadoRelacionado {
    pub id: i64,
    pub numero_wex: String,
    pub cliente: String,
    pub descricao: String,
    pub status: StatusChamado,
    pub criticidade: CriticidadeChamado,
    pub data_criacao: NaiveDateTime,
    pub score_similaridade: f64,
    pub motivos: Vec<String>,
    pub detalhes_scores: ScoresSimilaridade,
}

#[derive(Debug, Serialize)]
pub struct ParametrosBusca {
    pub score_minimo: f64,
    pub limite: usize,
}

#[derive(Debug, Serialize)]
pub struct RelacionadosResponse {
    pub id_chamado: i64,
    pub chamado_principal: ResumoChamado,
    pub chamados_similares: Vec<ChamadoRelacionado>,
    pub total_encontrados: usize,
    pub padroes_identificados: Vec<String>,
    pub parametros_busca: ParametrosBusca,
}

fn round3(valor: f64) -> f64 {
    (valor * 1000.0).round() / 1000.0
}

pub async fn triagem_automatica(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TriagemResponse>, ChamadosError> {
    let (chamado, _) = state.store.contexto_chamado(id).await?;
    let agora = Utc::now().naive_utc();

    let indicadores =
        classificar_criticidade(&chamado.descricao, &chamado.cliente_solicitante, agora);
    let score_sugerido = calcular_score_qualidade(&chamado.descricao);
    let tags_sugeridas = sugerir_tags(&chamado.descricao);
    let sugestoes = sugestoes_melhoria(&chamado.descricao, score_sugerido);

    Ok(Json(TriagemResponse {
        id_chamado: id,
        criticidade_atual: chamado.criticidade,
        criticidade_sugerida: indicadores.criticidade,
        confianca: round3(indicadores.confianca),
        fatores_identificados: indicadores.fatores,
        sugestoes_adicao: sugestoes,
        score_qualidade_atual: chamado.score_qualidade,
        score_qualidade_sugerido: score_sugerido,
        tags_atuais: chamado.tags_automaticas,
        tags_sugeridas,
        detalhes_scores: indicadores.scores,
    }))
}

pub async fn aplicar_triagem(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<AplicarTriagemResponse>, ChamadosError> {
    let (chamado, _) = state.store.contexto_chamado(id).await?;
    let agora = Utc::now().naive_utc();

    let indicadores =
        classificar_criticidade(&chamado.descricao, &chamado.cliente_solicitante, agora);
    let score = calcular_score_qualidade(&chamado.descricao);
    let tags = sugerir_tags(&chamado.descricao);

    let criticidade_anterior = chamado.criticidade;
    let atualizado = state
        .store
        .aplicar_triagem(id, indicadores.criticidade, score, tags.clone(), agora)
        .await?;
    tracing::info!(
        id,
        criticidade = %atualizado.chamado.criticidade,
        score,
        "triagem aplicada"
    );

    Ok(Json(AplicarTriagemResponse {
        success: true,
        chamado_id: id,
        mudancas: MudancasTriagem {
            criticidade: MudancaCriticidade {
                anterior: criticidade_anterior,
                nova: atualizado.chamado.criticidade,
            },
            score_qualidade: score,
            tags_adicionadas: tags,
        },
    }))
}

pub async fn sugestoes_followup(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SugestoesFollowUpResponse>, ChamadosError> {
    let (chamado, followups) = state.store.contexto_chamado(id).await?;
    let agora = Utc::now().naive_utc();

    let contexto = analisar_contexto(&chamado, &followups, agora);
    let resultado = gerar_sugestoes(&chamado, &contexto);

    let (todos, historicos) = state.store.snapshot_completo().await;
    let exemplos_historico = resolvidos_similares(&chamado, &todos, 5)
        .into_iter()
        .filter_map(|(similar_id, score, palavras_comuns)| {
            let registros = historicos.get(&similar_id)?;
            if registros.is_empty() {
                return None;
            }
            Some(ExemploHistorico {
                chamado_similar_id: similar_id,
                score_similaridade: round3(score),
                palavras_comuns,
                followups: registros
                    .iter()
                    .map(|f| ExemploFollowUp {
                        tipo: f.tipo,
                        descricao: f.descricao.chars().take(100).collect(),
                    })
                    .collect(),
            })
        })
        .collect();

    Ok(Json(SugestoesFollowUpResponse {
        id_chamado: id,
        sugestoes_principais: resultado.sugestoes,
        proximo_tipo_sugerido: resultado.proximo_tipo,
        prioridade: resultado.prioridade,
        contexto: ContextoResponse {
            status_atual: chamado.status,
            criticidade: chamado.criticidade,
            tempo_desde_criacao_horas: round3(contexto.tempo_desde_criacao),
            tempo_desde_ultimo_followup_horas: contexto.tempo_desde_ultimo.map(round3),
            total_followups_existentes: contexto.total_followups,
        },
        exemplos_historico,
        tipos_followup_existentes: contexto.tipos_existentes,
    }))
}

pub async fn criar_followup_sugerido(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<FollowUpSugeridoRequest>,
) -> Result<Json<FollowUpSugeridoResponse>, ChamadosError> {
    let (chamado, followups) = state.store.contexto_chamado(id).await?;
    let agora = Utc::now().naive_utc();

    let contexto = analisar_contexto(&chamado, &followups, agora);
    let resultado = gerar_sugestoes(&chamado, &contexto);

    let descricao = resultado
        .sugestoes
        .get(req.sugestao_index)
        .ok_or_else(|| ChamadosError::Validation("Índice de sugestão inválido".to_string()))?;

    let followup = state
        .store
        .criar_followup(
            id,
            FollowUpCreate {
                tipo: resultado.proximo_tipo,
                descricao: format!("[SUGESTÃO IA] {descricao}"),
                autor: req.autor,
                anexos: vec![],
            },
            agora,
        )
        .await?;

    Ok(Json(FollowUpSugeridoResponse {
        success: true,
        followup_criado: followup,
    }))
}

pub async fn chamados_relacionados(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<RelacionadosQuery>,
) -> Result<Json<RelacionadosResponse>, ChamadosError> {
    let (principal, _) = state.store.contexto_chamado(id).await?;
    let snapshot = state.store.snapshot().await;

    let score_minimo = query.score_minimo.unwrap_or(0.3).clamp(0.0, 1.0);
    let limite = query.limite.unwrap_or(10).min(50);

    let mut similares: Vec<(&Chamado, ScoresSimilaridade)> = snapshot
        .iter()
        .filter(|c| c.id != id)
        .map(|c| (c, calcular_similaridade(&principal, c)))
        .filter(|(_, scores)| scores.score_final >= score_minimo)
        .collect();
    similares.sort_by(|a, b| {
        b.1.score_final
            .partial_cmp(&a.1.score_final)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.id.cmp(&b.0.id))
    });

    let total_encontrados = similares.len();
    similares.truncate(limite);

    let grupo_analise: Vec<Chamado> = std::iter::once(principal.clone())
        .chain(similares.iter().take(5).map(|(c, _)| (*c).clone()))
        .collect();
    let padroes_identificados = identificar_padroes(&grupo_analise);

    let chamados_similares = similares
        .into_iter()
        .map(|(c, scores)| ChamadoRelacionado {
            id: c.id,
            numero_wex: c.numero_wex.clone(),
            cliente: c.cliente_solicitante.clone(),
            descricao: resumir_descricao(&c.descricao),
            status: c.status,
            criticidade: c.criticidade,
            data_criacao: c.data_criacao,
            score_similaridade: round3(scores.score_final),
            motivos: montar_motivos(&scores),
            detalhes_scores: scores,
        })
        .collect();

    Ok(Json(RelacionadosResponse {
        id_chamado: id,
        chamado_principal: ResumoChamado {
            numero_wex: principal.numero_wex.clone(),
            cliente: principal.cliente_solicitante.clone(),
            descricao: resumir_descricao(&principal.descricao),
            status: principal.status,
            criticidade: principal.criticidade,
        },
        chamados_similares,
        total_encontrados,
        padroes_identificados,
        parametros_busca: ParametrosBusca {
            score_minimo,
            limite,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct RelatorioPadroesQuery {
    pub dias: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ClienteAtivo {
    pub cliente: String,
    pub total_chamados: usize,
}

#[derive(Debug, Serialize)]
pub struct RelatorioPadroesResponse {
    pub periodo_inicio: NaiveDateTime,
    pub periodo_fim: NaiveDateTime,
    pub total_chamados: usize,
    pub total_grupos_similares: usize,
    pub padroes_globais: Vec<String>,
    pub distribuicao_criticidade: BTreeMap<String, i64>,
    pub clientes_mais_ativos: Vec<ClienteAtivo>,
    pub resumo: String,
}

fn distribuicao_criticidade(chamados: &[Chamado]) -> BTreeMap<String, i64> {
    let mut mapa: BTreeMap<String, i64> = CriticidadeChamado::TODAS
        .iter()
        .map(|c| (c.as_str().to_string(), 0))
        .collect();
    for chamado in chamados {
        *mapa
            .entry(chamado.criticidade.as_str().to_string())
            .or_insert(0) += 1;
    }
    mapa
}

fn clientes_mais_ativos(chamados: &[Chamado], limite: usize) -> Vec<ClienteAtivo> {
    let mut contagem: HashMap<&str, usize> = HashMap::new();
    for chamado in chamados {
        *contagem
            .entry(chamado.cliente_solicitante.as_str())
            .or_insert(0) += 1;
    }
    let mut itens: Vec<(&str, usize)> = contagem.into_iter().collect();
    itens.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    itens.truncate(limite);
    itens
        .into_iter()
        .map(|(cliente, total)| ClienteAtivo {
            cliente: cliente.to_string(),
            total_chamados: total,
        })
        .collect()
}

/// Relatório de padrões sobre os chamados do período: agrupa por
/// similaridade e consolida os padrões de cada grupo.
pub async fn relatorio_padroes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RelatorioPadroesQuery>,
) -> Result<Json<RelatorioPadroesResponse>, ChamadosError> {
    let dias = query.dias.unwrap_or(30);
    if !(1..=365).contains(&dias) {
        return Err(ChamadosError::Validation(
            "dias deve estar entre 1 e 365".to_string(),
        ));
    }

    let agora = Utc::now().naive_utc();
    let periodo_inicio = agora - Duration::days(dias);
    let periodo: Vec<Chamado> = state
        .store
        .snapshot()
        .await
        .into_iter()
        .filter(|c| c.data_criacao >= periodo_inicio)
        .collect();

    if periodo.is_empty() {
        return Ok(Json(RelatorioPadroesResponse {
            periodo_inicio,
            periodo_fim: agora,
            total_chamados: 0,
            total_grupos_similares: 0,
            padroes_globais: vec![],
            distribuicao_criticidade: distribuicao_criticidade(&[]),
            clientes_mais_ativos: vec![],
            resumo: "Nenhum chamado encontrado no período especificado".to_string(),
        }));
    }

    let grupos = agrupar_similares(&periodo, 0.4);
    let padroes_globais: Vec<String> = grupos
        .iter()
        .flat_map(|grupo| {
            identificar_padroes(grupo)
                .into_iter()
                .map(move |padrao| format!("Grupo de {} chamados: {padrao}", grupo.len()))
        })
        .collect();

    let resumo = format!(
        "Analisados {} chamados, identificados {} grupos de chamados similares",
        periodo.len(),
        grupos.len()
    );

    Ok(Json(RelatorioPadroesResponse {
        periodo_inicio,
        periodo_fim: agora,
        total_chamados: periodo.len(),
        total_grupos_similares: grupos.len(),
        padroes_globais,
        distribuicao_criticidade: distribuicao_criticidade(&periodo),
        clientes_mais_ativos: clientes_mais_ativos(&periodo, 5),
        resumo,
    }))
}

pub fn configure_triage_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/chamados/:id/triagem", post(triagem_automatica))
        .route("/api/triagem/aplicar/:id", post(aplicar_triagem))
        .route(
            "/api/chamados/:id/sugestoes-followup",
            get(sugestoes_followup),
        )
        .route(
            "/api/chamados/:id/followup-sugerido",
            post(criar_followup_sugerido),
        )
        .route("/api/chamados/:id/relacionados", get(chamados_relacionados))
        .route("/api/relatorios/padroes-ia", get(relatorio_padroes))
}
