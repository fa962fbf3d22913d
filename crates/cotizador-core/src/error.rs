use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid term: {term_months} months is not allowed for {plan} (allowed: {allowed})")]
    InvalidTerm {
        plan: String,
        term_months: u32,
        allowed: String,
    },

    #[error("Missing price: {field} is zero or absent (fallbacks tried: {tried})")]
    MissingPrice { field: String, tried: String },

    #[error("Insufficient down payment: {supplied} is below the required minimum of {minimum}")]
    InsufficientDownPayment { supplied: Decimal, minimum: Decimal },

    #[error("Initial payment of {initial_percent}% is too low: no discount applies below {minimum_percent}%")]
    DiscountTooLow {
        initial_percent: Decimal,
        minimum_percent: Decimal,
    },

    #[error("Initial payment of {initial_percent}% exceeds the highest discount tier ({maximum_percent}%): review the cash price")]
    DiscountTooHigh {
        initial_percent: Decimal,
        maximum_percent: Decimal,
    },

    #[error("No active configuration for {plan}: {reason}")]
    NoActiveConfiguration { plan: String, reason: String },

    #[error("Client tier {0} has no coefficients in the configured tier table")]
    UnknownClientTier(String),

    #[error("No financing base between {lower} and {upper} reaches a payment of {target_payment}")]
    NoFeasibleBase {
        target_payment: Decimal,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for QuoteError {
    fn from(e: serde_json::Error) -> Self {
        QuoteError::SerializationError(e.to_string())
    }
}
