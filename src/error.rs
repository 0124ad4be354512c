/**
* filename : error
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use thiserror::Error;

/// Rejected user input. Raised before anything reaches the exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending input field (`symbol`, `side`, `quantity`, ...)
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError { field, reason: reason.into() }
    }
}

#[derive(Error, Debug)]
pub enum TradingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Exchange error: {0}")]
    ExchangeError(String),

    #[error("Exchange rejected request (HTTP {status}): code {code}, {msg}")]
    Rejected { status: u16, code: i64, msg: String },

    /// Local lot step / tick check failed before submission
    #[error("Instrument filter: {0}")]
    InstrumentFilter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TradingError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TradingError::ExchangeError(format!("request timed out: {}", e))
        } else {
            TradingError::ExchangeError(format!("http error: {}", e))
        }
    }
}
