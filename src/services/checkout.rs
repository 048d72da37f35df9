use {
    crate::{
        config::Config,
        domain::{
            booking::PaymentStatus,
            correlation::CorrelationMetadata,
            error::OrchestratorError,
            gateway::{PaymentGateway, SessionSpec},
            id::BookingId,
            identity::Identity,
            money::{Currency, MinorUnits},
            store::BookingStore,
        },
    },
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub booking_id: String,
    pub service_name: String,
    pub total_amount: f64,
    pub currency: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub session_id: String,
}

/// Create a gateway checkout session for a booking and persist the session
/// id onto the booking record. The persisted id is what makes the later
/// refund lookup O(1) instead of a scan over the gateway's recent sessions.
pub async fn create_session(
    store: &dyn BookingStore,
    gateway: &dyn PaymentGateway,
    config: &Config,
    identity: &Identity,
    req: CheckoutRequest,
) -> Result<CheckoutResponse, OrchestratorError> {
    let booking_id = BookingId::new(req.booking_id)?;
    if req.service_name.trim().is_empty() {
        return Err(OrchestratorError::Validation(
            "service_name must not be empty".into(),
        ));
    }
    let amount = MinorUnits::from_major(req.total_amount)?;

    let currency = match req.currency.as_deref() {
        None => config.settlement_currency,
        Some(raw) => {
            let requested = Currency::try_from(raw)?;
            if requested != config.settlement_currency {
                return Err(OrchestratorError::Validation(format!(
                    "unsupported currency {requested}, this deployment settles in {}",
                    config.settlement_currency
                )));
            }
            requested
        }
    };

    let booking = store.get(&booking_id).await?.ok_or_else(|| {
        OrchestratorError::Validation(format!("unknown booking: {booking_id}"))
    })?;
    if booking.payment_status != PaymentStatus::Unpaid {
        return Err(OrchestratorError::Validation(format!(
            "booking {booking_id} is already {}",
            booking.payment_status
        )));
    }

    let correlation = CorrelationMetadata::new(
        booking_id.clone(),
        config.app_id.clone(),
        identity.email.clone(),
    )?;

    let spec = SessionSpec {
        service_name: req.service_name,
        amount,
        currency,
        success_url: req.success_url.unwrap_or_else(|| config.success_url.clone()),
        cancel_url: req.cancel_url.unwrap_or_else(|| config.cancel_url.clone()),
        correlation,
    };

    let created = gateway.create_checkout_session(&spec).await?;

    if !store.attach_checkout_session(&booking_id, &created.id).await? {
        // Session exists at the gateway but the booking moved under us.
        // Correlation metadata still maps its events back; only the O(1)
        // refund lookup is degraded, which is worth an operator's attention.
        tracing::error!(
            alert = "reconciliation",
            booking_id = %booking_id,
            session_id = %created.id,
            "checkout session created but booking no longer accepts it"
        );
    } else {
        tracing::info!(
            booking_id = %booking_id,
            session_id = %created.id,
            amount_minor = %amount,
            "checkout session created"
        );
    }

    Ok(CheckoutResponse {
        checkout_url: created.url,
        session_id: created.id.into_inner(),
    })
}
