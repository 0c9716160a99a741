use std::sync::Arc;

use crate::chamados::storage::ChamadoStore;
use crate::config::AppConfig;

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<ChamadoStore>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            store: Arc::clone(&self.store),
        }
    }
}
