use crate::domain::error::OrchestratorError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype over the domain error so the HTTP mapping lives in the adapter
/// layer. Input, auth, and signature failures carry their message to the
/// caller; upstream and persistence failures log the detail and answer with
/// a generic body.
pub struct ApiError(pub OrchestratorError);

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            OrchestratorError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            OrchestratorError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, msg.clone())
            }
            OrchestratorError::Signature(msg) => {
                tracing::warn!("webhook rejected: {msg}");
                (StatusCode::BAD_REQUEST, "Invalid signature".to_string())
            }
            OrchestratorError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            OrchestratorError::Upstream(msg) => {
                tracing::error!("gateway error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "payment gateway request failed".to_string(),
                )
            }
            OrchestratorError::Persistence(msg) => {
                tracing::error!("persistence error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
            OrchestratorError::OutOfOrder(msg) => {
                tracing::warn!("out-of-order event: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "event arrived out of order, retry".to_string(),
                )
            }
            OrchestratorError::Serialization(err) => {
                tracing::error!("serialization error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
