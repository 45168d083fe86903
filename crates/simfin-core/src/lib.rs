pub mod error;
pub mod rates;
pub mod time_value;
pub mod types;

#[cfg(feature = "financing")]
pub mod financing;

#[cfg(feature = "consortium")]
pub mod consortium;

#[cfg(feature = "comparison")]
pub mod comparison;

pub use error::SimfinError;
pub use types::*;

/// Standard result type for all simfin operations
pub type SimfinResult<T> = Result<T, SimfinError>;
