use std::sync::Arc;

use chrono::Utc;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wexserver::chamados::storage::ChamadoStore;
use wexserver::config::AppConfig;
use wexserver::seed;
use wexserver::server;
use wexserver::shared::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = AppConfig::from_env();
    let store = Arc::new(ChamadoStore::new());

    if args.iter().any(|a| a == "--seed") {
        let total = seed::carregar_dados_demo(&store, Utc::now().naive_utc())
            .await
            .map_err(|e| anyhow::anyhow!("falha ao carregar dados de demonstração: {e}"))?;
        info!("{total} chamados de demonstração carregados");
    }

    let state = Arc::new(AppState { config, store });
    server::run(state).await
}
