use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinplanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Monthly payment is too low to ever clear the debt. Minimum required: {minimum_payment}")]
    PaymentTooLow { minimum_payment: Decimal },

    #[error("Repayment would take more than {limit_months} months to clear")]
    TermTooLong { limit_months: u32 },

    #[error("Timeframe of {months} months is outside the allowed range [1, {max_months}]")]
    TimeframeOutOfRange { months: u32, max_months: u32 },

    #[error("Target balance not reached within the {cap_months}-month safety cap")]
    TargetNotReachable { cap_months: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FinplanError {
    fn from(e: serde_json::Error) -> Self {
        FinplanError::SerializationError(e.to_string())
    }
}
