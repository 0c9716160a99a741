pub mod metrics;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use std::sync::Arc;

use crate::shared::state::AppState;

pub use metrics::{calcular_metricas, DashboardMetricas};

pub async fn obter_metricas(State(state): State<Arc<AppState>>) -> Json<DashboardMetricas> {
    let snapshot = state.store.snapshot().await;
    Json(calcular_metricas(&snapshot, Utc::now().naive_utc()))
}

pub fn configure_dashboard_routes() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard/metricas", get(obter_metricas))
}
