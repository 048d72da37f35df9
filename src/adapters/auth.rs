use {
    crate::domain::{
        error::OrchestratorError,
        identity::{Identity, IdentityResolver},
    },
    axum::http::HeaderMap,
    subtle::ConstantTimeEq,
};

/// Service-token resolver: the surrounding application authenticates the end
/// user, then calls this subsystem with its shared bearer token and the
/// caller's email in `X-User-Email`.
pub struct TokenAuth {
    service_token: String,
}

impl TokenAuth {
    pub fn new(service_token: impl Into<String>) -> Self {
        Self {
            service_token: service_token.into(),
        }
    }
}

impl IdentityResolver for TokenAuth {
    fn resolve(&self, headers: &HeaderMap) -> Result<Identity, OrchestratorError> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                OrchestratorError::Authentication("missing bearer token".into())
            })?;

        let expected = self.service_token.as_bytes();
        if token.len() != expected.len()
            || !bool::from(token.as_bytes().ct_eq(expected))
        {
            return Err(OrchestratorError::Authentication("invalid token".into()));
        }

        let email = headers
            .get("x-user-email")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                OrchestratorError::Authentication("missing authenticated identity".into())
            })?;

        Ok(Identity {
            email: email.to_string(),
        })
    }
}
