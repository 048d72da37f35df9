use {
    crate::domain::{
        booking::PaymentStatus,
        error::OrchestratorError,
        gateway::PaymentGateway,
        id::BookingId,
        store::BookingStore,
    },
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub booking_id: String,
}

#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub refund_id: String,
}

/// Refund a paid booking. The stored payment intent makes the lookup O(1);
/// the `paid` precondition makes double refunds impossible from this path.
pub async fn initiate(
    store: &dyn BookingStore,
    gateway: &dyn PaymentGateway,
    req: RefundRequest,
) -> Result<RefundResponse, OrchestratorError> {
    let booking_id = BookingId::new(req.booking_id)?;

    let booking = store
        .get(&booking_id)
        .await?
        .filter(|b| b.payment_status == PaymentStatus::Paid)
        .ok_or_else(|| OrchestratorError::NotFound("No paid session found".into()))?;

    let Some(payment_intent_id) = booking.payment_intent_id.clone() else {
        // A paid booking always carries its payment intent; a missing one
        // means the record was mutated outside this subsystem.
        tracing::error!(
            alert = "reconciliation",
            booking_id = %booking_id,
            "paid booking has no payment intent"
        );
        return Err(OrchestratorError::Persistence(format!(
            "booking {booking_id} is paid but has no payment intent"
        )));
    };

    let refund = gateway.create_refund(&payment_intent_id).await?;

    // The gateway has moved the money. Apply our side with the same
    // compare-and-swap discipline as the webhook path: whichever path runs
    // first wins, the other becomes a no-op.
    match store.mark_refunded(&booking_id).await {
        Ok(true) => {
            tracing::info!(
                booking_id = %booking_id,
                refund_id = %refund.id,
                "refund applied"
            );
        }
        Ok(false) => {
            tracing::info!(
                booking_id = %booking_id,
                refund_id = %refund.id,
                "refund already reconciled via webhook"
            );
        }
        Err(err) => {
            // Money refunded upstream, local record still says paid. A retry
            // from the caller would attempt a second refund, so this must
            // reach an operator, not just the HTTP response.
            tracing::error!(
                alert = "reconciliation",
                booking_id = %booking_id,
                refund_id = %refund.id,
                "gateway refund succeeded but booking update failed: {err}"
            );
            return Err(err);
        }
    }

    Ok(RefundResponse {
        refund_id: refund.id,
    })
}
