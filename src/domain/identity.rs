use {super::error::OrchestratorError, axum::http::HeaderMap};

/// The caller on whose behalf a checkout or refund runs. The email feeds the
/// session's correlation metadata.
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
}

/// Collaborator seam for the authenticated-identity lookup. The surrounding
/// application owns user sessions; this subsystem only asks "who is calling,
/// or nobody?".
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Result<Identity, OrchestratorError>;
}
