#![allow(dead_code)]

use {
    bookpay::{
        AppState,
        adapters::auth::TokenAuth,
        config::Config,
        domain::{
            booking::{Booking, BookingStatus, PaymentStatus},
            error::OrchestratorError,
            gateway::{CreatedRefund, CreatedSession, PaymentGateway, SessionSpec},
            id::{BookingId, PaymentIntentId, SessionId},
            identity::Identity,
            money::Currency,
            store::BoxFuture,
        },
        infra::memory::MemoryStore,
    },
    hmac::{Hmac, Mac},
    sha2::Sha256,
    std::sync::{Arc, Mutex},
};

pub const APP_ID: &str = "bookpay-test";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const SERVICE_TOKEN: &str = "svc_test_token";
pub const CUSTOMER_EMAIL: &str = "customer@example.com";

pub fn test_config() -> Config {
    Config {
        database_url: "postgresql://unused".into(),
        stripe_secret_key: "sk_test_unused".into(),
        webhook_secret: WEBHOOK_SECRET.into(),
        app_id: APP_ID.into(),
        service_token: SERVICE_TOKEN.into(),
        settlement_currency: Currency::Usd,
        success_url: "https://bookings.example.com/payment/success".into(),
        cancel_url: "https://bookings.example.com/payment/cancel".into(),
        bind_addr: "127.0.0.1:0".into(),
    }
}

pub fn identity() -> Identity {
    Identity {
        email: CUSTOMER_EMAIL.into(),
    }
}

// ── Stub gateway ───────────────────────────────────────────────────────────

#[derive(Default)]
struct StubInner {
    sessions: Mutex<Vec<SessionSpec>>,
    refunds: Mutex<Vec<PaymentIntentId>>,
    fail_refunds: Mutex<bool>,
}

/// Records every outbound call; never talks to a network.
#[derive(Clone, Default)]
pub struct StubGateway {
    inner: Arc<StubInner>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_sessions(&self) -> Vec<SessionSpec> {
        self.inner.sessions.lock().unwrap().clone()
    }

    pub fn refund_calls(&self) -> Vec<PaymentIntentId> {
        self.inner.refunds.lock().unwrap().clone()
    }

    pub fn fail_refunds(&self, fail: bool) {
        *self.inner.fail_refunds.lock().unwrap() = fail;
    }
}

impl PaymentGateway for StubGateway {
    fn create_checkout_session(
        &self,
        spec: &SessionSpec,
    ) -> BoxFuture<'_, Result<CreatedSession, OrchestratorError>> {
        let spec = spec.clone();
        Box::pin(async move {
            let mut sessions = self.inner.sessions.lock().unwrap();
            sessions.push(spec);
            let n = sessions.len();
            Ok(CreatedSession {
                id: SessionId::new(format!("cs_test_{n}")).unwrap(),
                url: format!("https://checkout.test/pay/cs_test_{n}"),
            })
        })
    }

    fn create_refund(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> BoxFuture<'_, Result<CreatedRefund, OrchestratorError>> {
        let payment_intent_id = payment_intent_id.clone();
        Box::pin(async move {
            if *self.inner.fail_refunds.lock().unwrap() {
                return Err(OrchestratorError::Upstream(
                    "stub gateway refused the refund".into(),
                ));
            }
            let mut refunds = self.inner.refunds.lock().unwrap();
            refunds.push(payment_intent_id);
            let n = refunds.len();
            Ok(CreatedRefund {
                id: format!("re_test_{n}"),
                status: Some("succeeded".into()),
            })
        })
    }
}

pub fn test_state() -> (AppState, MemoryStore, StubGateway) {
    let store = MemoryStore::new();
    let gateway = StubGateway::new();
    let state = AppState {
        store: Arc::new(store.clone()),
        gateway: Arc::new(gateway.clone()),
        auth: Arc::new(TokenAuth::new(SERVICE_TOKEN)),
        config: Arc::new(test_config()),
    };
    (state, store, gateway)
}

// ── Booking fixtures ───────────────────────────────────────────────────────

pub fn seed_booking(store: &MemoryStore, id: &str, total_amount: f64) -> BookingId {
    let booking_id = BookingId::new(id).unwrap();
    store.insert_booking(Booking::unpaid(booking_id.clone(), total_amount));
    booking_id
}

pub fn seed_paid_booking(store: &MemoryStore, id: &str, payment_intent: &str) -> BookingId {
    let booking_id = BookingId::new(id).unwrap();
    store.insert_booking(Booking {
        id: booking_id.clone(),
        status: BookingStatus::Confirmed,
        payment_status: PaymentStatus::Paid,
        total_amount: 150.0,
        checkout_session_id: Some(SessionId::new("cs_test_seed").unwrap()),
        payment_intent_id: Some(PaymentIntentId::new(payment_intent).unwrap()),
    });
    booking_id
}

// ── Webhook fixtures ───────────────────────────────────────────────────────

/// Sign a body the way the gateway does: `t=<unix>,v1=<hex hmac-sha256>`
/// over `"{t}.{body}"`.
pub fn sign_with(secret: &str, body: &[u8], timestamp: i64) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

pub fn sign(body: &[u8]) -> String {
    sign_with(WEBHOOK_SECRET, body, chrono::Utc::now().timestamp())
}

pub fn completed_body(event_id: &str, session_id: &str, payment_intent: &str, booking_id: &str) -> String {
    serde_json::json!({
        "id": event_id,
        "type": "checkout.session.completed",
        "created": 1_700_000_000,
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "payment_intent": payment_intent,
                "payment_status": "paid",
                "metadata": {
                    "booking_id": booking_id,
                    "app_id": APP_ID,
                    "customer_email": CUSTOMER_EMAIL,
                }
            }
        }
    })
    .to_string()
}

pub fn refunded_body(event_id: &str, charge_id: &str, payment_intent: &str) -> String {
    serde_json::json!({
        "id": event_id,
        "type": "charge.refunded",
        "created": 1_700_000_100,
        "data": {
            "object": {
                "id": charge_id,
                "object": "charge",
                "payment_intent": payment_intent,
                "refunded": true,
            }
        }
    })
    .to_string()
}
