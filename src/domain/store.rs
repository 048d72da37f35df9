use {
    super::booking::{Booking, PaymentTransition},
    super::error::OrchestratorError,
    super::id::{BookingId, EventId, PaymentIntentId, SessionId},
    std::{future::Future, pin::Pin},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of one atomic ledger-check + conditional-mutation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Event recorded, booking mutated.
    Applied,
    /// Event id already in the ledger — redelivery, successful no-op.
    Duplicate,
    /// Event recorded but the precondition no longer held (the other path
    /// got there first, or the booking vanished). Successful no-op.
    Superseded,
    /// Refund arrived before the completion was applied. Nothing recorded;
    /// the caller answers retryable so the gateway redelivers later.
    OutOfOrder,
}

/// Persistence seam for the payment lifecycle: booking correlation fields,
/// conditional state mutation, and the idempotency ledger. Implementations
/// must make `apply_event` a single atomic unit — ledger insert and booking
/// mutation both happen or neither does.
pub trait BookingStore: Send + Sync {
    fn get(
        &self,
        id: &BookingId,
    ) -> BoxFuture<'_, Result<Option<Booking>, OrchestratorError>>;

    /// O(1) refund-path lookup via the payment intent persisted at
    /// completion time.
    fn find_by_payment_intent(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> BoxFuture<'_, Result<Option<Booking>, OrchestratorError>>;

    /// Persist the session id created for a booking. Conditional on the
    /// booking still being unpaid; returns whether a row was updated.
    fn attach_checkout_session(
        &self,
        id: &BookingId,
        session_id: &SessionId,
    ) -> BoxFuture<'_, Result<bool, OrchestratorError>>;

    /// The reconciler's atomic core: check-and-record the event id in the
    /// ledger, then apply the transition if its precondition holds.
    fn apply_event(
        &self,
        event_id: &EventId,
        event_type: &str,
        booking_id: &BookingId,
        transition: &PaymentTransition,
    ) -> BoxFuture<'_, Result<ApplyOutcome, OrchestratorError>>;

    /// Synchronous refund path: `paid → refunded` guarded by a
    /// compare-and-swap on `payment_status`, no ledger entry (the gateway
    /// refund call itself is the guard). Returns whether the swap applied;
    /// `false` means the refund webhook won the race.
    fn mark_refunded(
        &self,
        id: &BookingId,
    ) -> BoxFuture<'_, Result<bool, OrchestratorError>>;
}
