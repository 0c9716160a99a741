//! Montagem do router HTTP e ciclo de vida do servidor.

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{default_dev_origins, AppConfig};
use crate::shared::state::AppState;
use crate::{chamados, dashboard, triage};

pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "WEX Intelligence API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/api/health",
    }))
}

pub async fn health_check(State(_state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "wexserver",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

fn create_cors_layer(config: &AppConfig) -> CorsLayer {
    let origens = if config.cors_allowed_origins.is_empty() {
        default_dev_origins()
    } else {
        config.cors_allowed_origins.clone()
    };
    let origens: Vec<HeaderValue> = origens.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(origens)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = create_cors_layer(&state.config);

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health_check))
        .merge(chamados::configure_chamados_routes())
        .merge(dashboard::configure_dashboard_routes())
        .merge(triage::configure_triage_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.config.bind_addr();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("escutando em {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("falha ao instalar handler de ctrl-c: {e}");
        return;
    }
    info!("sinal de desligamento recebido");
}
