use {
    super::error::OrchestratorError,
    super::id::{BookingId, PaymentIntentId, SessionId},
    serde::{Deserialize, Serialize},
    std::fmt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Status the booking takes when its payment completes. Only a pending
    /// booking is promoted; anything further along keeps its status.
    pub fn on_payment_completed(&self) -> BookingStatus {
        match self {
            Self::Pending => Self::Confirmed,
            other => *other,
        }
    }

    /// Status the booking takes when its payment is refunded. A completed
    /// booking keeps `completed` — the service was already rendered.
    pub fn on_refunded(&self) -> BookingStatus {
        match self {
            Self::Pending | Self::Confirmed | Self::InProgress => Self::Cancelled,
            other => *other,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for BookingStatus {
    type Error = OrchestratorError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(OrchestratorError::Validation(format!(
                "unknown booking status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }

    /// Lifecycle rank — higher means further along. The reconciler never
    /// moves a booking to a lower rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Unpaid => 0,
            Self::Paid => 1,
            Self::Refunded => 2,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = OrchestratorError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            other => Err(OrchestratorError::Validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// The two payment transitions this subsystem applies to a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentTransition {
    /// A verified completion event: `unpaid → paid`, sets the payment
    /// intent, promotes a pending booking to confirmed.
    Complete { payment_intent_id: PaymentIntentId },
    /// A verified refund event: `paid → refunded`, cancels the booking
    /// unless the service already completed.
    Refund,
}

impl PaymentTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete { .. } => "payment_completed",
            Self::Refund => "refunded",
        }
    }
}

/// What the reconciler should do with a transition given the booking's
/// current payment status. Both store implementations route through this so
/// Postgres and the in-memory store cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    /// Precondition holds: mutate the booking and record the event.
    Apply,
    /// Precondition no longer holds (duplicate effect or already further
    /// along): record the event, leave the booking alone.
    RecordOnly,
    /// A refund reached a booking that was never paid: reject without
    /// recording, so the gateway's redelivery can apply it after the
    /// completion event lands.
    Defer,
}

impl PaymentStatus {
    pub fn decide(&self, transition: &PaymentTransition) -> TransitionDecision {
        match (transition, self) {
            (PaymentTransition::Complete { .. }, Self::Unpaid) => TransitionDecision::Apply,
            (PaymentTransition::Complete { .. }, Self::Paid | Self::Refunded) => {
                TransitionDecision::RecordOnly
            }
            (PaymentTransition::Refund, Self::Paid) => TransitionDecision::Apply,
            (PaymentTransition::Refund, Self::Refunded) => TransitionDecision::RecordOnly,
            (PaymentTransition::Refund, Self::Unpaid) => TransitionDecision::Defer,
        }
    }
}

/// Payment-lifecycle view of a booking. The booking domain owns the record;
/// this subsystem reads it and mutates `status`, `payment_status`, and the
/// two gateway correlation fields — nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Decimal amount in major currency units, as the booking domain stores it.
    pub total_amount: f64,
    pub checkout_session_id: Option<SessionId>,
    pub payment_intent_id: Option<PaymentIntentId>,
}

impl Booking {
    /// A fresh booking as the booking domain creates it, before any payment
    /// activity. Used by tests and by store seeding helpers.
    pub fn unpaid(id: BookingId, total_amount: f64) -> Self {
        Self {
            id,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            total_amount,
            checkout_session_id: None,
            payment_intent_id: None,
        }
    }
}
