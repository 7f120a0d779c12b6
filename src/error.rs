use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{engine::EngineError, ingest::IngestError};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Engine(EngineError::UnknownUser(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            // No interaction data loaded at all: the service is up but
            // cannot rank anything yet.
            AppError::Engine(EngineError::EmptyCatalog) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            // Referential-integrity violation; upstream cleansing failed.
            AppError::Engine(EngineError::UnknownItem(_)) | AppError::Ingest(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
