pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;

use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    std::{sync::Arc, time::Duration},
    tower_http::timeout::TimeoutLayer,
};

use crate::domain::{
    gateway::PaymentGateway, identity::IdentityResolver, store::BookingStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub auth: Arc<dyn IdentityResolver>,
    pub config: Arc<config::Config>,
}

/// The gateway expects an acknowledgment within a few seconds; a slower
/// handler answers late-and-retryable rather than holding the connection.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/checkout-sessions",
            post(adapters::http::create_checkout_session),
        )
        .route("/webhooks/payment", post(adapters::http::payment_webhook))
        .route("/refunds", post(adapters::http::create_refund))
        .layer(DefaultBodyLimit::max(64 * 1024)) // 64 KB — gateway events are typically <20 KB
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}
