use {
    super::error::OrchestratorError,
    super::id::BookingId,
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
};

const KEY_BOOKING_ID: &str = "booking_id";
const KEY_APP_ID: &str = "app_id";
const KEY_CUSTOMER_EMAIL: &str = "customer_email";

/// The metadata attached to every checkout session. This triple is the only
/// mechanism that maps gateway events back to a booking (there is no foreign
/// key on the gateway side), so it is a fixed, typed structure validated on
/// both write and read, never an open-ended bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationMetadata {
    booking_id: BookingId,
    app_id: String,
    customer_email: String,
}

impl CorrelationMetadata {
    pub fn new(
        booking_id: BookingId,
        app_id: impl Into<String>,
        customer_email: impl Into<String>,
    ) -> Result<Self, OrchestratorError> {
        let app_id = app_id.into();
        let customer_email = customer_email.into();
        if app_id.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "correlation app_id must not be empty".into(),
            ));
        }
        if customer_email.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "correlation customer_email must not be empty".into(),
            ));
        }
        Ok(Self {
            booking_id,
            app_id,
            customer_email,
        })
    }

    pub fn booking_id(&self) -> &BookingId {
        &self.booking_id
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    /// Render as the flat string map the gateway stores on the session.
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            (KEY_BOOKING_ID.to_string(), self.booking_id.to_string()),
            (KEY_APP_ID.to_string(), self.app_id.clone()),
            (KEY_CUSTOMER_EMAIL.to_string(), self.customer_email.clone()),
        ])
    }

    /// Read back from the metadata object on an incoming event, validating
    /// that all three fields survived the round trip.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, OrchestratorError> {
        let booking_id = map
            .get(KEY_BOOKING_ID)
            .ok_or_else(|| {
                OrchestratorError::Validation("metadata missing booking_id".into())
            })
            .and_then(|raw| BookingId::new(raw.clone()))?;
        let app_id = map.get(KEY_APP_ID).cloned().ok_or_else(|| {
            OrchestratorError::Validation("metadata missing app_id".into())
        })?;
        let customer_email = map.get(KEY_CUSTOMER_EMAIL).cloned().ok_or_else(|| {
            OrchestratorError::Validation("metadata missing customer_email".into())
        })?;
        Self::new(booking_id, app_id, customer_email)
    }
}
