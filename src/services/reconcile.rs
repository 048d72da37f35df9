use crate::domain::{
    booking::PaymentTransition,
    error::OrchestratorError,
    event::{EVENT_CHARGE_REFUNDED, EVENT_CHECKOUT_COMPLETED, EventKind, PaymentEvent},
    id::{BookingId, EventId},
    store::{ApplyOutcome, BookingStore},
};

/// How a verified event landed. Everything here is an acknowledged outcome;
/// out-of-order refunds surface as `OrchestratorError::OutOfOrder` instead
/// so the gateway redelivers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Transition applied and recorded.
    Applied(BookingId),
    /// Redelivery of an already-processed event.
    Duplicate,
    /// Recorded, but the other path got there first — no state change.
    Superseded(BookingId),
    /// Authentic but not for us (unknown type, foreign app, unpaid session).
    Ignored,
    /// No booking matched the correlation metadata or payment intent.
    /// A missing correlation is not transient, so this still acknowledges.
    Unmatched,
}

/// Dispatch a verified event to the booking it concerns and apply its
/// transition exactly once.
pub async fn ingest(
    store: &dyn BookingStore,
    event: PaymentEvent,
) -> Result<IngestOutcome, OrchestratorError> {
    match event.kind {
        EventKind::CheckoutCompleted {
            session_id,
            payment_intent_id,
            correlation,
        } => {
            let booking_id = correlation.booking_id().clone();
            if store.get(&booking_id).await?.is_none() {
                tracing::warn!(
                    event_id = %event.id,
                    booking_id = %booking_id,
                    session_id = %session_id,
                    "completion event references an unknown booking"
                );
                return Ok(IngestOutcome::Unmatched);
            }
            apply(
                store,
                &event.id,
                EVENT_CHECKOUT_COMPLETED,
                &booking_id,
                PaymentTransition::Complete { payment_intent_id },
            )
            .await
        }
        EventKind::ChargeRefunded {
            payment_intent_id,
            charge_id,
        } => {
            let Some(booking) = store.find_by_payment_intent(&payment_intent_id).await? else {
                tracing::warn!(
                    event_id = %event.id,
                    payment_intent_id = %payment_intent_id,
                    charge_id = %charge_id,
                    "refund event references an unknown payment intent"
                );
                return Ok(IngestOutcome::Unmatched);
            };
            apply(
                store,
                &event.id,
                EVENT_CHARGE_REFUNDED,
                &booking.id,
                PaymentTransition::Refund,
            )
            .await
        }
        EventKind::Ignored { event_type, reason } => {
            tracing::info!(event_id = %event.id, event_type, reason, "event acknowledged without action");
            Ok(IngestOutcome::Ignored)
        }
    }
}

/// Run one transition through the store's atomic ledger-and-mutate unit.
pub async fn apply(
    store: &dyn BookingStore,
    event_id: &EventId,
    event_type: &str,
    booking_id: &BookingId,
    transition: PaymentTransition,
) -> Result<IngestOutcome, OrchestratorError> {
    match store
        .apply_event(event_id, event_type, booking_id, &transition)
        .await?
    {
        ApplyOutcome::Applied => {
            tracing::info!(
                event_id = %event_id,
                booking_id = %booking_id,
                transition = transition.as_str(),
                "transition applied"
            );
            Ok(IngestOutcome::Applied(booking_id.clone()))
        }
        ApplyOutcome::Duplicate => {
            tracing::info!(event_id = %event_id, "duplicate event, already processed");
            Ok(IngestOutcome::Duplicate)
        }
        ApplyOutcome::Superseded => {
            tracing::info!(
                event_id = %event_id,
                booking_id = %booking_id,
                transition = transition.as_str(),
                "event recorded, precondition no longer holds"
            );
            Ok(IngestOutcome::Superseded(booking_id.clone()))
        }
        ApplyOutcome::OutOfOrder => Err(OrchestratorError::OutOfOrder(format!(
            "refund for {booking_id} arrived before its completion event"
        ))),
    }
}
