use {
    crate::domain::{
        error::OrchestratorError,
        gateway::{CreatedRefund, CreatedSession, PaymentGateway, SessionSpec},
        id::{PaymentIntentId, SessionId},
        money::Currency,
        store::BoxFuture,
    },
};

pub struct StripeGateway {
    client: stripe::Client,
}

impl StripeGateway {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: stripe::Client::new(secret_key),
        }
    }
}

fn convert_currency(c: Currency) -> stripe::Currency {
    match c {
        Currency::Usd => stripe::Currency::USD,
        Currency::Eur => stripe::Currency::EUR,
        Currency::Gbp => stripe::Currency::GBP,
        Currency::Jpy => stripe::Currency::JPY,
    }
}

fn upstream(e: stripe::StripeError) -> OrchestratorError {
    OrchestratorError::Upstream(format!("Stripe API: {e}"))
}

impl PaymentGateway for StripeGateway {
    fn create_checkout_session(
        &self,
        spec: &SessionSpec,
    ) -> BoxFuture<'_, Result<CreatedSession, OrchestratorError>> {
        let spec = spec.clone();
        Box::pin(async move { self.create_checkout_session_inner(&spec).await })
    }

    fn create_refund(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> BoxFuture<'_, Result<CreatedRefund, OrchestratorError>> {
        let payment_intent_id = payment_intent_id.clone();
        Box::pin(async move { self.create_refund_inner(&payment_intent_id).await })
    }
}

impl StripeGateway {
    async fn create_checkout_session_inner(
        &self,
        spec: &SessionSpec,
    ) -> Result<CreatedSession, OrchestratorError> {
        let mut price_data = stripe::CreateCheckoutSessionLineItemsPriceData {
            currency: convert_currency(spec.currency),
            ..Default::default()
        };
        price_data.product_data = Some(
            stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                name: spec.service_name.clone(),
                ..Default::default()
            },
        );
        price_data.unit_amount = Some(spec.amount.minor());

        let mut params = stripe::CreateCheckoutSession::new();
        params.mode = Some(stripe::CheckoutSessionMode::Payment);
        params.success_url = Some(&spec.success_url);
        params.cancel_url = Some(&spec.cancel_url);
        params.customer_email = Some(spec.correlation.customer_email());
        params.client_reference_id = Some(spec.correlation.booking_id().as_str());
        params.line_items = Some(vec![stripe::CreateCheckoutSessionLineItems {
            price_data: Some(price_data),
            quantity: Some(1),
            ..Default::default()
        }]);
        params.metadata = Some(spec.correlation.to_map());

        let session = stripe::CheckoutSession::create(&self.client, params)
            .await
            .map_err(upstream)?;

        let url = session.url.ok_or_else(|| {
            OrchestratorError::Upstream("checkout session has no URL".into())
        })?;

        Ok(CreatedSession {
            id: SessionId::new(session.id.to_string())?,
            url,
        })
    }

    async fn create_refund_inner(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> Result<CreatedRefund, OrchestratorError> {
        let pi_id = payment_intent_id
            .as_str()
            .parse::<stripe::PaymentIntentId>()
            .map_err(|e| {
                OrchestratorError::Upstream(format!("invalid PaymentIntent id: {e}"))
            })?;

        let mut params = stripe::CreateRefund::new();
        params.payment_intent = Some(pi_id);

        let refund = stripe::Refund::create(&self.client, params)
            .await
            .map_err(upstream)?;

        Ok(CreatedRefund {
            id: refund.id.to_string(),
            status: refund.status.map(|s| s.to_string()),
        })
    }
}
