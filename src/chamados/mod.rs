pub mod error;
pub mod storage;
pub mod types;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use crate::shared::state::AppState;

pub use error::ChamadosError;
pub use storage::ChamadoStore;
pub use types::*;

pub async fn listar_chamados(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ChamadoListResponse>, ChamadosError> {
    let filtros = ChamadoFiltros::from_pairs(&params)?;
    Ok(Json(state.store.listar_chamados(filtros).await))
}

pub async fn obter_chamado(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ChamadoResponse>, ChamadosError> {
    Ok(Json(state.store.obter_chamado(id).await?))
}

pub async fn criar_chamado(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChamadoCreate>,
) -> Result<Json<ChamadoResponse>, ChamadosError> {
    let agora = Utc::now().naive_utc();
    let criado = state.store.criar_chamado(req, agora).await?;
    tracing::info!(id = criado.chamado.id, numero_wex = %criado.chamado.numero_wex, "chamado criado");
    Ok(Json(criado))
}

pub async fn atualizar_chamado(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<ChamadoUpdate>,
) -> Result<Json<ChamadoResponse>, ChamadosError> {
    let agora = Utc::now().naive_utc();
    Ok(Json(state.store.atualizar_chamado(id, patch, agora).await?))
}

pub async fn listar_followups(
    State(state): State<Arc<AppState>>,
    Path(chamado_id): Path<i64>,
) -> Result<Json<Vec<FollowUp>>, ChamadosError> {
    Ok(Json(state.store.listar_followups(chamado_id).await?))
}

pub async fn criar_followup(
    State(state): State<Arc<AppState>>,
    Path(chamado_id): Path<i64>,
    Json(req): Json<FollowUpCreate>,
) -> Result<Json<FollowUp>, ChamadosError> {
    let agora = Utc::now().naive_utc();
    let criado = state.store.criar_followup(chamado_id, req, agora).await?;
    tracing::info!(chamado_id, followup_id = criado.id, "follow-up criado");
    Ok(Json(criado))
}

pub fn configure_chamados_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chamados", get(listar_chamados).post(criar_chamado))
        .route("/chamados/:id", get(obter_chamado).put(atualizar_chamado))
        .route(
            "/chamados/:id/followups",
            get(listar_followups).post(criar_followup),
        )
}
