use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("authentication: {0}")]
    Authentication(String),

    #[error("webhook signature: {0}")]
    Signature(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("gateway: {0}")]
    Upstream(String),

    #[error("persistence: {0}")]
    Persistence(String),

    /// A refund event reached a booking that has not been paid yet.
    /// Retryable: the gateway redelivers after the completion event lands.
    #[error("out of order: {0}")]
    OutOfOrder(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for OrchestratorError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
