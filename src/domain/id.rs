use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::error::OrchestratorError;

/// Internal booking identifier. Opaque, but never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn new(id: impl Into<String>) -> Result<Self, OrchestratorError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "booking_id must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Gateway checkout-session identifier (`cs_xxx`).
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Result<Self, OrchestratorError> {
        let id = id.into();
        if !id.starts_with("cs_") {
            return Err(OrchestratorError::Validation(format!(
                "SessionId must start with cs_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Gateway payment-intent identifier (`pi_xxx`). Stable across the
/// completion and refund events of one payment.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentIntentId(String);

impl PaymentIntentId {
    pub fn new(id: impl Into<String>) -> Result<Self, OrchestratorError> {
        let id = id.into();
        if !id.starts_with("pi_") {
            return Err(OrchestratorError::Validation(format!(
                "PaymentIntentId must start with pi_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Gateway event identifier (`evt_xxx`). Stable across redeliveries of the
/// same event, which is what makes it usable as the idempotency ledger key.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Result<Self, OrchestratorError> {
        let id = id.into();
        if !id.starts_with("evt_") {
            return Err(OrchestratorError::Validation(format!(
                "EventId must start with evt_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
