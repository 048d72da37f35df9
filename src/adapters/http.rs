use {
    crate::{
        AppState,
        adapters::{api_errors::ApiError, webhook},
        domain::error::OrchestratorError,
        services::{checkout, reconcile, refund},
    },
    axum::{Json, body::Bytes, extract::State, http::HeaderMap},
};

pub async fn create_checkout_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<checkout::CheckoutRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let identity = state.auth.resolve(&headers)?;
    let created = checkout::create_session(
        state.store.as_ref(),
        state.gateway.as_ref(),
        &state.config,
        &identity,
        req,
    )
    .await?;

    Ok(Json(serde_json::json!({
        "checkout_url": created.checkout_url,
        "session_id": created.session_id,
    })))
}

#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event_id = tracing::field::Empty)
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sig = headers
        .get("X-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| OrchestratorError::Signature("missing X-Signature header".into()))?;

    // Verify over the raw bytes exactly as delivered.
    webhook::verify_signature(&state.config.webhook_secret, &body, sig)?;

    let event = webhook::parse_event(&body, &state.config.app_id)?;
    tracing::Span::current().record("event_id", tracing::field::display(&event.id));

    reconcile::ingest(state.store.as_ref(), event).await?;

    Ok(Json(serde_json::json!({ "received": true })))
}

pub async fn create_refund(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<refund::RefundRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.auth.resolve(&headers)?;
    let refunded = refund::initiate(state.store.as_ref(), state.gateway.as_ref(), req).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "refund_id": refunded.refund_id,
    })))
}
