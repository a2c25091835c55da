use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::bounding_box::BoundingBoxError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(#[from] BoundingBoxError),

    #[error("Static data error: {0}")]
    StaticData(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Tile fetch failed: {0}")]
    Tile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_message) = match self {
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.as_str()),
            AppError::InvalidBoundingBox(ref e) => {
                tracing::info!("Rejected bounding box: {}", e);
                (StatusCode::BAD_REQUEST, message.as_str())
            }
            AppError::StaticData(ref e) => {
                tracing::error!("Static data error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Static data unavailable")
            }
            AppError::Render(ref e) => {
                tracing::error!("Render failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Visualisation failed")
            }
            AppError::Tile(ref e) => {
                tracing::warn!("Tile fetch failed: {}", e);
                (StatusCode::BAD_GATEWAY, "Basemap service error")
            }
            AppError::Io(ref e) => {
                tracing::error!("I/O error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
