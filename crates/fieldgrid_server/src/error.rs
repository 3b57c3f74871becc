//! HTTP error mapping for API handlers.

use crate::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fieldgrid_core::sync::SaveResponse;
use serde_json::json;
use thiserror::Error;

/// Handler error rendered as `{"error": "..."}`.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct HttpError(#[from] pub AppError);

impl HttpError {
    /// Status code and client-facing message.
    ///
    /// Storage failures are logged and reported with a generic message.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::StorageMessage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            other => {
                tracing::error!("Internal error: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Handler error rendered as the save envelope
/// `{"success": false, "data": "..."}`.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct EnvelopeError(#[from] pub HttpError);

impl From<AppError> for EnvelopeError {
    fn from(value: AppError) -> Self {
        Self(HttpError(value))
    }
}

impl IntoResponse for EnvelopeError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.status_and_message();
        (status, Json(SaveResponse::failure(message))).into_response()
    }
}
