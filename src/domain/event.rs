use {
    super::correlation::CorrelationMetadata,
    super::id::{EventId, PaymentIntentId, SessionId},
};

pub const EVENT_CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const EVENT_CHARGE_REFUNDED: &str = "charge.refunded";

/// A verified, typed gateway event. Delivery is at-least-once with no
/// ordering guarantee; `id` is stable across redeliveries.
#[derive(Debug, Clone)]
pub struct PaymentEvent {
    pub id: EventId,
    /// Gateway-side creation timestamp (unix seconds).
    pub created: i64,
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
pub enum EventKind {
    /// `checkout.session.completed` whose session was actually paid and
    /// whose correlation metadata resolved to this application.
    CheckoutCompleted {
        session_id: SessionId,
        payment_intent_id: PaymentIntentId,
        correlation: CorrelationMetadata,
    },
    /// `charge.refunded`, mapped back to a booking via the stored
    /// payment-intent identifier.
    ChargeRefunded {
        payment_intent_id: PaymentIntentId,
        charge_id: String,
    },
    /// Authentic but uninteresting: unknown type, another deployment's
    /// session, or a payload this subsystem deliberately skips. Always
    /// acknowledged without action.
    Ignored { event_type: String, reason: String },
}
