mod common;

use bookpay::adapters::webhook::parse_event;
use bookpay::domain::booking::{Booking, BookingStatus, PaymentStatus};
use bookpay::domain::error::OrchestratorError;
use bookpay::domain::id::{BookingId, PaymentIntentId, SessionId};
use bookpay::services::reconcile::{IngestOutcome, ingest};
use common::*;

async fn deliver(
    store: &bookpay::infra::memory::MemoryStore,
    body: &str,
) -> Result<IngestOutcome, OrchestratorError> {
    let event = parse_event(body.as_bytes(), APP_ID).unwrap();
    ingest(store, event).await
}

// ── 1. completion_marks_booking_paid_and_confirmed ─────────────────────────

#[tokio::test]
async fn completion_marks_booking_paid_and_confirmed() {
    let (_state, store, _gateway) = test_state();
    let booking_id = seed_booking(&store, "b1", 150.0);

    let outcome = deliver(&store, &completed_body("evt_c1", "cs_test_1", "pi_1", "b1"))
        .await
        .unwrap();
    assert_eq!(outcome, IngestOutcome::Applied(booking_id.clone()));

    let booking = store.booking(&booking_id).unwrap();
    assert_eq!(booking.payment_status, PaymentStatus::Paid);
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.payment_intent_id.unwrap().as_str(), "pi_1");
}

// ── 2. redelivery_is_a_successful_no_op ────────────────────────────────────

#[tokio::test]
async fn redelivery_is_a_successful_no_op() {
    let (_state, store, _gateway) = test_state();
    let booking_id = seed_booking(&store, "b1", 150.0);

    let body = completed_body("evt_dup", "cs_test_1", "pi_1", "b1");
    deliver(&store, &body).await.unwrap();
    let second = deliver(&store, &body).await.unwrap();

    assert_eq!(second, IngestOutcome::Duplicate);
    assert_eq!(store.processed_count(), 1);

    // Exactly one mutation, exactly one audit row for it.
    let audits = store.audit_entries(&booking_id);
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].action, "status_changed");
}

// ── 3. refund_after_completion_applies ─────────────────────────────────────

#[tokio::test]
async fn refund_after_completion_applies() {
    let (_state, store, _gateway) = test_state();
    let booking_id = seed_booking(&store, "b1", 150.0);

    deliver(&store, &completed_body("evt_c1", "cs_test_1", "pi_1", "b1"))
        .await
        .unwrap();
    let outcome = deliver(&store, &refunded_body("evt_r1", "ch_1", "pi_1"))
        .await
        .unwrap();

    assert_eq!(outcome, IngestOutcome::Applied(booking_id.clone()));
    let booking = store.booking(&booking_id).unwrap();
    assert_eq!(booking.payment_status, PaymentStatus::Refunded);
    assert_eq!(booking.status, BookingStatus::Cancelled);
}

// ── 4. refund_before_completion_converges_via_redelivery ───────────────────
// The refund is rejected as retryable without touching the ledger; once the
// completion lands, the redelivered refund applies. Net effect: exactly one
// pass through paid, ending refunded.

#[tokio::test]
async fn refund_before_completion_converges_via_redelivery() {
    let (_state, store, _gateway) = test_state();
    let booking_id = BookingId::new("b1").unwrap();
    store.insert_booking(Booking {
        id: booking_id.clone(),
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        total_amount: 150.0,
        checkout_session_id: Some(SessionId::new("cs_test_1").unwrap()),
        // Stored during an apply that is still in flight on the other path.
        payment_intent_id: Some(PaymentIntentId::new("pi_1").unwrap()),
    });

    let refund = refunded_body("evt_r1", "ch_1", "pi_1");
    let err = deliver(&store, &refund).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::OutOfOrder(_)));
    assert!(!store.has_processed(&bookpay::domain::id::EventId::new("evt_r1").unwrap()));

    deliver(&store, &completed_body("evt_c1", "cs_test_1", "pi_1", "b1"))
        .await
        .unwrap();

    // The gateway redelivers the identical refund event.
    let outcome = deliver(&store, &refund).await.unwrap();
    assert_eq!(outcome, IngestOutcome::Applied(booking_id.clone()));
    assert_eq!(
        store.booking(&booking_id).unwrap().payment_status,
        PaymentStatus::Refunded
    );
}

// ── 5. completion_after_refund_is_superseded_but_recorded ──────────────────

#[tokio::test]
async fn completion_after_refund_is_superseded_but_recorded() {
    let (_state, store, _gateway) = test_state();
    let booking_id = seed_booking(&store, "b1", 150.0);

    deliver(&store, &completed_body("evt_c1", "cs_test_1", "pi_1", "b1"))
        .await
        .unwrap();
    deliver(&store, &refunded_body("evt_r1", "ch_1", "pi_1"))
        .await
        .unwrap();

    // A second, distinct completion event for the same session (gateway
    // pathology): precondition gone, but the event must still be recorded.
    let outcome = deliver(&store, &completed_body("evt_c2", "cs_test_1", "pi_1", "b1"))
        .await
        .unwrap();
    assert_eq!(outcome, IngestOutcome::Superseded(booking_id.clone()));
    assert!(store.has_processed(&bookpay::domain::id::EventId::new("evt_c2").unwrap()));

    let booking = store.booking(&booking_id).unwrap();
    assert_eq!(booking.payment_status, PaymentStatus::Refunded);
}

// ── 6. completed_service_keeps_status_on_refund ────────────────────────────

#[tokio::test]
async fn completed_service_keeps_status_on_refund() {
    let (_state, store, _gateway) = test_state();
    let booking_id = BookingId::new("b-done").unwrap();
    store.insert_booking(Booking {
        id: booking_id.clone(),
        status: BookingStatus::Completed,
        payment_status: PaymentStatus::Paid,
        total_amount: 150.0,
        checkout_session_id: None,
        payment_intent_id: Some(PaymentIntentId::new("pi_done").unwrap()),
    });

    deliver(&store, &refunded_body("evt_r1", "ch_1", "pi_done"))
        .await
        .unwrap();

    let booking = store.booking(&booking_id).unwrap();
    assert_eq!(booking.payment_status, PaymentStatus::Refunded);
    // The service was rendered; refunding the money does not cancel it.
    assert_eq!(booking.status, BookingStatus::Completed);
}

// ── 7. unknown_booking_is_acknowledged ─────────────────────────────────────

#[tokio::test]
async fn unknown_booking_is_acknowledged() {
    let (_state, store, _gateway) = test_state();

    let outcome = deliver(
        &store,
        &completed_body("evt_c1", "cs_test_1", "pi_1", "b-nobody"),
    )
    .await
    .unwrap();
    assert_eq!(outcome, IngestOutcome::Unmatched);
}

// ── 8. unmapped_refund_is_acknowledged ─────────────────────────────────────

#[tokio::test]
async fn unmapped_refund_is_acknowledged() {
    let (_state, store, _gateway) = test_state();
    seed_booking(&store, "b1", 150.0);

    // No booking carries pi_stranger; missing correlation is not transient.
    let outcome = deliver(&store, &refunded_body("evt_r1", "ch_1", "pi_stranger"))
        .await
        .unwrap();
    assert_eq!(outcome, IngestOutcome::Unmatched);
}

// ── 9. ignored_events_are_acknowledged ─────────────────────────────────────

#[tokio::test]
async fn ignored_events_are_acknowledged() {
    let (_state, store, _gateway) = test_state();

    let body = serde_json::json!({
        "id": "evt_x",
        "type": "payment_intent.created",
        "created": 1_700_000_000,
        "data": { "object": { "id": "pi_x" } }
    })
    .to_string();

    let outcome = deliver(&store, &body).await.unwrap();
    assert_eq!(outcome, IngestOutcome::Ignored);
}

// ── 10. concurrent_duplicate_deliveries_collapse_to_one ────────────────────
// 10 tasks deliver the same event. Exactly one applies; the rest see the
// ledger record.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_deliveries_collapse_to_one() {
    let (_state, store, _gateway) = test_state();
    let booking_id = seed_booking(&store, "b1", 150.0);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let body = completed_body("evt_race", "cs_test_1", "pi_1", "b1");
            deliver(&store, &body).await.unwrap()
        }));
    }

    let mut applied = 0;
    let mut duplicates = 0;
    for h in handles {
        match h.await.unwrap() {
            IngestOutcome::Applied(_) => applied += 1,
            IngestOutcome::Duplicate => duplicates += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(applied, 1, "exactly 1 applied");
    assert_eq!(duplicates, 9, "9 duplicates");
    assert_eq!(store.audit_entries(&booking_id).len(), 1);
}
