use axum::{response::IntoResponse, Json};

#[derive(Debug, thiserror::Error)]
pub enum ChamadosError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Referential(String),
    #[error("{0}")]
    Internal(String),
}

impl ChamadosError {
    pub fn chamado_nao_encontrado(id: i64) -> Self {
        Self::NotFound(format!("Chamado {id} não encontrado"))
    }
}

impl IntoResponse for ChamadosError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, message) = match &self {
            Self::NotFound(msg) | Self::Referential(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
