//! Error type shared by every calculator in the crate.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmortizationError {
    #[error("Principal must be > 0 (got {0}).")]
    InvalidPrincipal(Decimal),

    #[error("{field} must be > 0 and span at least one payment period (got {value} years).")]
    InvalidTerm { field: &'static str, value: Decimal },

    #[error("Annual interest rate must be >= 0 (got {0}).")]
    InvalidRate(Decimal),

    #[error("Arithmetic overflow while computing {0}.")]
    Overflow(&'static str),

    #[error("Invalid rate curve: {0}")]
    InvalidCurve(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl AmortizationError {
    pub(crate) fn term(field: &'static str, value: Decimal) -> Self {
        AmortizationError::InvalidTerm { field, value }
    }
}

pub type Result<T> = std::result::Result<T, AmortizationError>;
