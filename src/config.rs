use {crate::domain::money::Currency, std::env};

/// Process configuration, read once at startup. Tests construct this
/// directly instead of going through the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub stripe_secret_key: String,
    /// Webhook signing secret shared with the gateway.
    pub webhook_secret: String,
    /// Application identifier embedded in correlation metadata; events whose
    /// metadata carries a different id belong to another deployment.
    pub app_id: String,
    /// Bearer token the surrounding application authenticates with.
    pub service_token: String,
    pub settlement_currency: Currency,
    pub success_url: String,
    pub cancel_url: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let settlement_currency = env::var("SETTLEMENT_CURRENCY")
            .map(|raw| {
                Currency::try_from(raw.as_str()).expect("SETTLEMENT_CURRENCY must be a known currency")
            })
            .unwrap_or(Currency::Usd);

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .expect("STRIPE_SECRET_KEY must be set"),
            webhook_secret: env::var("WEBHOOK_SIGNING_SECRET")
                .expect("WEBHOOK_SIGNING_SECRET must be set"),
            app_id: env::var("APP_ID").expect("APP_ID must be set"),
            service_token: env::var("SERVICE_TOKEN").expect("SERVICE_TOKEN must be set"),
            settlement_currency,
            success_url: env::var("CHECKOUT_SUCCESS_URL")
                .expect("CHECKOUT_SUCCESS_URL must be set"),
            cancel_url: env::var("CHECKOUT_CANCEL_URL")
                .expect("CHECKOUT_CANCEL_URL must be set"),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
        }
    }
}
