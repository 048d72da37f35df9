use uuid::Uuid;

/// One row of the payment audit trail, written in the same atomic unit as
/// the mutation it describes.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: Uuid,
    pub booking_id: Option<String>,
    pub event_id: Option<String>,
    pub action: String,
    pub actor: String,
    pub detail: serde_json::Value,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            booking_id: None,
            event_id: None,
            action: action.into(),
            actor: actor.into(),
            detail: serde_json::json!({}),
        }
    }

    pub fn booking(mut self, booking_id: impl Into<String>) -> Self {
        self.booking_id = Some(booking_id.into());
        self
    }

    pub fn event(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}
