use {
    crate::domain::{
        audit::AuditEntry,
        booking::{Booking, PaymentStatus, PaymentTransition, TransitionDecision},
        error::OrchestratorError,
        id::{BookingId, EventId, PaymentIntentId, SessionId},
        store::{ApplyOutcome, BookingStore, BoxFuture},
    },
    chrono::{DateTime, Utc},
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
};

const ACTOR_WEBHOOK: &str = "webhook:gateway";

#[derive(Debug, Clone)]
pub struct LedgerRecord {
    pub booking_id: String,
    pub event_type: String,
    pub processed_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    bookings: HashMap<String, Booking>,
    ledger: HashMap<String, LedgerRecord>,
    audit: Vec<AuditEntry>,
}

/// Mutex-backed store for tests and local development. The single lock gives
/// the same atomicity the Postgres implementation gets from a transaction
/// plus a per-booking advisory lock.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_booking(&self, booking: Booking) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.bookings.insert(booking.id.to_string(), booking);
    }

    pub fn booking(&self, id: &BookingId) -> Option<Booking> {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.bookings.get(id.as_str()).cloned()
    }

    pub fn has_processed(&self, event_id: &EventId) -> bool {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.ledger.contains_key(event_id.as_str())
    }

    pub fn processed_count(&self) -> usize {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.ledger.len()
    }

    pub fn audit_entries(&self, booking_id: &BookingId) -> Vec<AuditEntry> {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner
            .audit
            .iter()
            .filter(|e| e.booking_id.as_deref() == Some(booking_id.as_str()))
            .cloned()
            .collect()
    }
}

impl BookingStore for MemoryStore {
    fn get(
        &self,
        id: &BookingId,
    ) -> BoxFuture<'_, Result<Option<Booking>, OrchestratorError>> {
        let id = id.clone();
        Box::pin(async move { Ok(self.booking(&id)) })
    }

    fn find_by_payment_intent(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> BoxFuture<'_, Result<Option<Booking>, OrchestratorError>> {
        let payment_intent_id = payment_intent_id.clone();
        Box::pin(async move {
            let inner = self.inner.lock().expect("memory store poisoned");
            Ok(inner
                .bookings
                .values()
                .find(|b| b.payment_intent_id.as_ref() == Some(&payment_intent_id))
                .cloned())
        })
    }

    fn attach_checkout_session(
        &self,
        id: &BookingId,
        session_id: &SessionId,
    ) -> BoxFuture<'_, Result<bool, OrchestratorError>> {
        let id = id.clone();
        let session_id = session_id.clone();
        Box::pin(async move {
            let mut inner = self.inner.lock().expect("memory store poisoned");
            match inner.bookings.get_mut(id.as_str()) {
                Some(b) if b.payment_status == PaymentStatus::Unpaid => {
                    b.checkout_session_id = Some(session_id);
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn apply_event(
        &self,
        event_id: &EventId,
        event_type: &str,
        booking_id: &BookingId,
        transition: &PaymentTransition,
    ) -> BoxFuture<'_, Result<ApplyOutcome, OrchestratorError>> {
        let event_id = event_id.clone();
        let event_type = event_type.to_string();
        let booking_id = booking_id.clone();
        let transition = transition.clone();
        Box::pin(async move {
            let mut inner = self.inner.lock().expect("memory store poisoned");

            if inner.ledger.contains_key(event_id.as_str()) {
                return Ok(ApplyOutcome::Duplicate);
            }

            let decision = match inner.bookings.get(booking_id.as_str()) {
                Some(b) => b.payment_status.decide(&transition),
                // Booking vanished between dispatch and apply: record the
                // event so redeliveries stay no-ops.
                None => TransitionDecision::RecordOnly,
            };

            if decision == TransitionDecision::Defer {
                return Ok(ApplyOutcome::OutOfOrder);
            }

            inner.ledger.insert(
                event_id.as_str().to_string(),
                LedgerRecord {
                    booking_id: booking_id.to_string(),
                    event_type: event_type.clone(),
                    processed_at: Utc::now(),
                },
            );

            let outcome = match decision {
                TransitionDecision::Apply => {
                    let Some(booking) = inner.bookings.get_mut(booking_id.as_str()) else {
                        return Err(OrchestratorError::Persistence(format!(
                            "booking {booking_id} vanished mid-apply"
                        )));
                    };
                    let old_status = booking.payment_status;
                    match &transition {
                        PaymentTransition::Complete { payment_intent_id } => {
                            booking.payment_status = PaymentStatus::Paid;
                            booking.payment_intent_id = Some(payment_intent_id.clone());
                            booking.status = booking.status.on_payment_completed();
                        }
                        PaymentTransition::Refund => {
                            booking.payment_status = PaymentStatus::Refunded;
                            booking.status = booking.status.on_refunded();
                        }
                    }
                    let new_status = booking.payment_status;
                    inner.audit.push(
                        AuditEntry::new("status_changed", ACTOR_WEBHOOK)
                            .booking(booking_id.as_str())
                            .event(event_id.as_str())
                            .detail(serde_json::json!({
                                "event_type": event_type,
                                "old_status": old_status.as_str(),
                                "new_status": new_status.as_str(),
                            })),
                    );
                    ApplyOutcome::Applied
                }
                TransitionDecision::RecordOnly => {
                    inner.audit.push(
                        AuditEntry::new("event_received", ACTOR_WEBHOOK)
                            .booking(booking_id.as_str())
                            .event(event_id.as_str())
                            .detail(serde_json::json!({
                                "event_type": event_type,
                                "superseded": true,
                            })),
                    );
                    ApplyOutcome::Superseded
                }
                TransitionDecision::Defer => unreachable!("handled above"),
            };

            Ok(outcome)
        })
    }

    fn mark_refunded(
        &self,
        id: &BookingId,
    ) -> BoxFuture<'_, Result<bool, OrchestratorError>> {
        let id = id.clone();
        Box::pin(async move {
            let mut inner = self.inner.lock().expect("memory store poisoned");
            let Some(booking) = inner.bookings.get_mut(id.as_str()) else {
                return Ok(false);
            };
            if booking.payment_status != PaymentStatus::Paid {
                return Ok(false);
            }
            booking.payment_status = PaymentStatus::Refunded;
            booking.status = booking.status.on_refunded();
            inner.audit.push(
                AuditEntry::new("status_changed", "refund:orchestrator")
                    .booking(id.as_str())
                    .detail(serde_json::json!({
                        "old_status": PaymentStatus::Paid.as_str(),
                        "new_status": PaymentStatus::Refunded.as_str(),
                    })),
            );
            Ok(true)
        })
    }
}
