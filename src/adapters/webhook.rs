use {
    crate::domain::{
        correlation::CorrelationMetadata,
        error::OrchestratorError,
        event::{EVENT_CHARGE_REFUNDED, EVENT_CHECKOUT_COMPLETED, EventKind, PaymentEvent},
        id::{EventId, PaymentIntentId, SessionId},
    },
    hmac::{Hmac, Mac},
    serde::Deserialize,
    sha2::Sha256,
    std::collections::HashMap,
    subtle::ConstantTimeEq,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a webhook timestamp before it is rejected.
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;
/// Allowed clock skew for timestamps from the future.
const FUTURE_SKEW_SECS: i64 = 60;

/// Verify the `X-Signature` header (`t=<unix>,v1=<hex hmac-sha256>`) over
/// the raw body bytes. Verification must never run over re-serialized JSON:
/// any formatting difference would silently accept forged events.
pub fn verify_signature(
    secret: &str,
    body: &[u8],
    signature: &str,
) -> Result<(), OrchestratorError> {
    verify_signature_at(secret, body, signature, chrono::Utc::now().timestamp())
}

/// Verification core with an injected clock so tolerance edges are testable.
pub fn verify_signature_at(
    secret: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> Result<(), OrchestratorError> {
    let mut timestamp = None;
    let mut sig_v1 = None;
    for part in signature.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(s) = part.strip_prefix("v1=") {
            sig_v1 = Some(s);
        }
    }

    let timestamp_str = timestamp.ok_or_else(|| {
        OrchestratorError::Signature("missing timestamp in signature header".into())
    })?;
    let sig_v1 = sig_v1.ok_or_else(|| {
        OrchestratorError::Signature("missing v1 signature in signature header".into())
    })?;

    let timestamp: i64 = timestamp_str.parse().map_err(|_| {
        OrchestratorError::Signature("invalid timestamp in signature header".into())
    })?;

    // Replay window: stale or future-dated deliveries are rejected outright.
    let age = now - timestamp;
    if age > TIMESTAMP_TOLERANCE_SECS {
        return Err(OrchestratorError::Signature(format!(
            "timestamp too old (age {age}s)"
        )));
    }
    if age < -FUTURE_SKEW_SECS {
        return Err(OrchestratorError::Signature(format!(
            "timestamp in the future (age {age}s)"
        )));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| OrchestratorError::Signature("invalid signing secret".into()))?;
    mac.update(timestamp_str.as_bytes());
    mac.update(b".");
    mac.update(body);
    let expected = hex::encode(mac.finalize().into_bytes());

    // Signature length is not secret (64 hex chars); the content is.
    if expected.len() != sig_v1.len()
        || !bool::from(expected.as_bytes().ct_eq(sig_v1.as_bytes()))
    {
        return Err(OrchestratorError::Signature("signature mismatch".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct Envelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    id: String,
    payment_intent: Option<String>,
    payment_status: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ChargeObject {
    id: String,
    payment_intent: Option<String>,
}

/// Classify a verified body into a typed event. Authentic-but-uninteresting
/// payloads come back as `Ignored` so the handler acknowledges them; only a
/// body that is not valid JSON at all is an error.
pub fn parse_event(body: &[u8], app_id: &str) -> Result<PaymentEvent, OrchestratorError> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| OrchestratorError::Validation(format!("malformed event body: {e}")))?;
    let id = EventId::new(envelope.id)?;
    let created = envelope.created;

    let kind = match envelope.event_type.as_str() {
        EVENT_CHECKOUT_COMPLETED => parse_checkout_completed(&envelope.data.object, app_id)
            .unwrap_or_else(|reason| EventKind::Ignored {
                event_type: envelope.event_type.clone(),
                reason,
            }),
        EVENT_CHARGE_REFUNDED => parse_charge_refunded(&envelope.data.object)
            .unwrap_or_else(|reason| EventKind::Ignored {
                event_type: envelope.event_type.clone(),
                reason,
            }),
        _ => EventKind::Ignored {
            event_type: envelope.event_type.clone(),
            reason: "unhandled event type".into(),
        },
    };

    Ok(PaymentEvent { id, created, kind })
}

fn parse_checkout_completed(
    object: &serde_json::Value,
    app_id: &str,
) -> Result<EventKind, String> {
    let session: CheckoutSessionObject = serde_json::from_value(object.clone())
        .map_err(|e| format!("invalid checkout session object: {e}"))?;

    // Sessions completed through asynchronous payment methods report
    // payment_status != "paid" here; a later event carries the settlement.
    if session.payment_status.as_deref() != Some("paid") {
        return Err("session completed but not paid".into());
    }

    let session_id = SessionId::new(session.id).map_err(|e| e.to_string())?;
    let payment_intent_id = session
        .payment_intent
        .ok_or_else(|| "session has no payment intent".to_string())
        .and_then(|pi| PaymentIntentId::new(pi).map_err(|e| e.to_string()))?;
    let correlation =
        CorrelationMetadata::from_map(&session.metadata).map_err(|e| e.to_string())?;

    if correlation.app_id() != app_id {
        return Err(format!(
            "session belongs to another application: {}",
            correlation.app_id()
        ));
    }

    Ok(EventKind::CheckoutCompleted {
        session_id,
        payment_intent_id,
        correlation,
    })
}

fn parse_charge_refunded(object: &serde_json::Value) -> Result<EventKind, String> {
    let charge: ChargeObject = serde_json::from_value(object.clone())
        .map_err(|e| format!("invalid charge object: {e}"))?;

    let payment_intent_id = charge
        .payment_intent
        .ok_or_else(|| "charge has no payment intent".to_string())
        .and_then(|pi| PaymentIntentId::new(pi).map_err(|e| e.to_string()))?;

    Ok(EventKind::ChargeRefunded {
        payment_intent_id,
        charge_id: charge.id,
    })
}
