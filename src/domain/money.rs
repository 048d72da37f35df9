use {
    super::error::OrchestratorError,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Largest chargeable amount in major units. Stripe caps single charges well
/// below this; anything bigger is caller error, not a real booking.
const MAX_MAJOR_AMOUNT: f64 = 1_000_000_000.0;

/// An amount in minor currency units (cents). Always positive: this
/// subsystem only ever charges or refunds a whole booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinorUnits(i64);

impl MinorUnits {
    pub fn new(minor: i64) -> Result<Self, OrchestratorError> {
        if minor <= 0 {
            return Err(OrchestratorError::Validation(format!(
                "amount must be positive, got: {minor}"
            )));
        }
        Ok(Self(minor))
    }

    /// Convert a decimal amount in major units to minor units.
    ///
    /// Policy: `round(amount * 100)` with halves rounded away from zero
    /// (`f64::round` semantics), so `150.5 → 15050` and `99.999 → 10000`.
    pub fn from_major(amount: f64) -> Result<Self, OrchestratorError> {
        if !amount.is_finite() {
            return Err(OrchestratorError::Validation(
                "total_amount must be a finite number".into(),
            ));
        }
        if amount <= 0.0 {
            return Err(OrchestratorError::Validation(format!(
                "total_amount must be positive, got: {amount}"
            )));
        }
        if amount > MAX_MAJOR_AMOUNT {
            return Err(OrchestratorError::Validation(format!(
                "total_amount exceeds maximum, got: {amount}"
            )));
        }
        Self::new((amount * 100.0).round() as i64)
    }

    pub fn minor(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settlement currencies the gateway adapter knows how to charge in.
/// A deployment settles in exactly one of them (configured at startup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
            Self::Gbp => "gbp",
            Self::Jpy => "jpy",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Currency {
    type Error = OrchestratorError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            "gbp" => Ok(Self::Gbp),
            "jpy" => Ok(Self::Jpy),
            other => Err(OrchestratorError::Validation(format!(
                "unknown currency: {other}"
            ))),
        }
    }
}
