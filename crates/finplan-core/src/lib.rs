pub mod error;
pub mod rates;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "projection")]
pub mod projection;

#[cfg(feature = "target")]
pub mod target;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "savings")]
pub mod savings;

pub use error::FinplanError;
pub use types::*;

/// Standard result type for all finplan operations
pub type FinplanResult<T> = Result<T, FinplanError>;
