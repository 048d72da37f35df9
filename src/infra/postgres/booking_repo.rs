use {
    super::audit_repo::insert_audit_entry,
    crate::domain::{
        audit::AuditEntry,
        booking::{Booking, BookingStatus, PaymentStatus, PaymentTransition, TransitionDecision},
        error::OrchestratorError,
        id::{BookingId, EventId, PaymentIntentId, SessionId},
        store::{ApplyOutcome, BookingStore, BoxFuture},
    },
    sqlx::PgPool,
};

const ACTOR_WEBHOOK: &str = "webhook:gateway";

type BookingRow = (
    String,
    String,
    String,
    f64,
    Option<String>,
    Option<String>,
);

const SELECT_BOOKING: &str = "SELECT id, status, payment_status, total_amount, \
     checkout_session_id, payment_intent_id FROM bookings";

fn booking_from_row(row: BookingRow) -> Result<Booking, OrchestratorError> {
    let (id, status, payment_status, total_amount, session_id, payment_intent_id) = row;
    Ok(Booking {
        id: BookingId::new(id)?,
        status: BookingStatus::try_from(status.as_str())?,
        payment_status: PaymentStatus::try_from(payment_status.as_str())?,
        total_amount,
        checkout_session_id: session_id.map(SessionId::new).transpose()?,
        payment_intent_id: payment_intent_id.map(PaymentIntentId::new).transpose()?,
    })
}

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl BookingStore for PostgresStore {
    fn get(
        &self,
        id: &BookingId,
    ) -> BoxFuture<'_, Result<Option<Booking>, OrchestratorError>> {
        let id = id.clone();
        Box::pin(async move {
            let row: Option<BookingRow> =
                sqlx::query_as(&format!("{SELECT_BOOKING} WHERE id = $1"))
                    .bind(id.as_str())
                    .fetch_optional(&self.pool)
                    .await?;
            row.map(booking_from_row).transpose()
        })
    }

    fn find_by_payment_intent(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> BoxFuture<'_, Result<Option<Booking>, OrchestratorError>> {
        let payment_intent_id = payment_intent_id.clone();
        Box::pin(async move {
            let row: Option<BookingRow> =
                sqlx::query_as(&format!("{SELECT_BOOKING} WHERE payment_intent_id = $1"))
                    .bind(payment_intent_id.as_str())
                    .fetch_optional(&self.pool)
                    .await?;
            row.map(booking_from_row).transpose()
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
            let result = sqlx::query(
                "UPDATE bookings SET checkout_session_id = $2, updated_at = now() \
                 WHERE id = $1 AND payment_status = 'unpaid'",
            )
            .bind(id.as_str())
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected() > 0)
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
            self.apply_event_inner(&event_id, &event_type, &booking_id, &transition)
                .await
        })
    }

    fn mark_refunded(
        &self,
        id: &BookingId,
    ) -> BoxFuture<'_, Result<bool, OrchestratorError>> {
        let id = id.clone();
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;
            let result = sqlx::query(
                "UPDATE bookings SET payment_status = 'refunded', \
                 status = CASE WHEN status IN ('pending','confirmed','in_progress') \
                               THEN 'cancelled' ELSE status END, \
                 updated_at = now() \
                 WHERE id = $1 AND payment_status = 'paid'",
            )
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

            let applied = result.rows_affected() > 0;
            if applied {
                let audit = AuditEntry::new("status_changed", "refund:orchestrator")
                    .booking(id.as_str())
                    .detail(serde_json::json!({
                        "old_status": PaymentStatus::Paid.as_str(),
                        "new_status": PaymentStatus::Refunded.as_str(),
                    }));
                insert_audit_entry(&mut tx, &audit).await?;
            }
            tx.commit().await?;
            Ok(applied)
        })
    }
}

impl PostgresStore {
    /// Ledger insert and conditional mutation in one transaction, serialized
    /// per booking. The advisory lock works even before any row exists for
    /// the booking's events, so concurrent first deliveries don't race.
    async fn apply_event_inner(
        &self,
        event_id: &EventId,
        event_type: &str,
        booking_id: &BookingId,
        transition: &PaymentTransition,
    ) -> Result<ApplyOutcome, OrchestratorError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET LOCAL lock_timeout = '5s'")
            .execute(&mut *tx)
            .await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(booking_id.as_str())
            .execute(&mut *tx)
            .await?;

        // Ledger check-and-set: the unique key on event_id is what makes
        // concurrent deliveries of the same event collapse to one effect.
        let inserted: Option<bool> = sqlx::query_scalar(
            "INSERT INTO processed_events (event_id, booking_id, event_type) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (event_id) DO NOTHING \
             RETURNING true",
        )
        .bind(event_id.as_str())
        .bind(booking_id.as_str())
        .bind(event_type)
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_none() {
            tx.commit().await?;
            return Ok(ApplyOutcome::Duplicate);
        }

        let current: Option<(String,)> =
            sqlx::query_as("SELECT payment_status FROM bookings WHERE id = $1")
                .bind(booking_id.as_str())
                .fetch_optional(&mut *tx)
                .await?;
        let current = current
            .map(|(raw,)| PaymentStatus::try_from(raw.as_str()))
            .transpose()?;

        let decision = match current {
            Some(status) => status.decide(transition),
            // Booking vanished between dispatch and apply: keep the ledger
            // record so redeliveries stay no-ops.
            None => TransitionDecision::RecordOnly,
        };

        match decision {
            TransitionDecision::Defer => {
                // Refund ahead of its completion. Roll the ledger insert
                // back so the gateway's redelivery can apply it later.
                tx.rollback().await?;
                Ok(ApplyOutcome::OutOfOrder)
            }
            TransitionDecision::RecordOnly => {
                let audit = AuditEntry::new("event_received", ACTOR_WEBHOOK)
                    .booking(booking_id.as_str())
                    .event(event_id.as_str())
                    .detail(serde_json::json!({
                        "event_type": event_type,
                        "superseded": true,
                    }));
                insert_audit_entry(&mut tx, &audit).await?;
                tx.commit().await?;
                Ok(ApplyOutcome::Superseded)
            }
            TransitionDecision::Apply => {
                let old_status = current.unwrap_or(PaymentStatus::Unpaid);
                let result = match transition {
                    PaymentTransition::Complete { payment_intent_id } => {
                        sqlx::query(
                            "UPDATE bookings SET payment_status = 'paid', \
                             payment_intent_id = $2, \
                             status = CASE WHEN status = 'pending' \
                                           THEN 'confirmed' ELSE status END, \
                             updated_at = now() \
                             WHERE id = $1 AND payment_status = 'unpaid'",
                        )
                        .bind(booking_id.as_str())
                        .bind(payment_intent_id.as_str())
                        .execute(&mut *tx)
                        .await?
                    }
                    PaymentTransition::Refund => {
                        sqlx::query(
                            "UPDATE bookings SET payment_status = 'refunded', \
                             status = CASE WHEN status IN ('pending','confirmed','in_progress') \
                                           THEN 'cancelled' ELSE status END, \
                             updated_at = now() \
                             WHERE id = $1 AND payment_status = 'paid'",
                        )
                        .bind(booking_id.as_str())
                        .execute(&mut *tx)
                        .await?
                    }
                };

                if result.rows_affected() == 0 {
                    // The advisory lock makes this unreachable, but a lost
                    // CAS must never pass silently as an applied transition.
                    tx.rollback().await?;
                    return Err(OrchestratorError::Persistence(format!(
                        "conditional update lost for booking {booking_id}"
                    )));
                }

                let new_status = match transition {
                    PaymentTransition::Complete { .. } => PaymentStatus::Paid,
                    PaymentTransition::Refund => PaymentStatus::Refunded,
                };
                let audit = AuditEntry::new("status_changed", ACTOR_WEBHOOK)
                    .booking(booking_id.as_str())
                    .event(event_id.as_str())
                    .detail(serde_json::json!({
                        "event_type": event_type,
                        "old_status": old_status.as_str(),
                        "new_status": new_status.as_str(),
                    }));
                insert_audit_entry(&mut tx, &audit).await?;
                tx.commit().await?;
                Ok(ApplyOutcome::Applied)
            }
        }
    }
}
