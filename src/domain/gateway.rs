use {
    super::correlation::CorrelationMetadata,
    super::error::OrchestratorError,
    super::id::{PaymentIntentId, SessionId},
    super::money::{Currency, MinorUnits},
    super::store::BoxFuture,
};

/// Everything the gateway needs to host a one-time payment page for a
/// booking.
#[derive(Debug, Clone)]
pub struct SessionSpec {
    pub service_name: String,
    pub amount: MinorUnits,
    pub currency: Currency,
    pub success_url: String,
    pub cancel_url: String,
    pub correlation: CorrelationMetadata,
}

#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub id: SessionId,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct CreatedRefund {
    pub id: String,
    pub status: Option<String>,
}

/// Outbound gateway seam. The production implementation talks to Stripe;
/// tests substitute a stub. Constructed once at startup and threaded through
/// `AppState` instead of living in a global client handle.
pub trait PaymentGateway: Send + Sync {
    fn create_checkout_session(
        &self,
        spec: &SessionSpec,
    ) -> BoxFuture<'_, Result<CreatedSession, OrchestratorError>>;

    fn create_refund(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> BoxFuture<'_, Result<CreatedRefund, OrchestratorError>>;
}
