use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimfinError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid term: {term} months is outside [1, {ceiling}]")]
    InvalidTerm { term: u32, ceiling: u32 },

    #[error("Invalid budget: {0} must be greater than zero")]
    InvalidBudget(Decimal),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SimfinError {
    fn from(e: serde_json::Error) -> Self {
        SimfinError::SerializationError(e.to_string())
    }
}
