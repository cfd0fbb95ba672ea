use thiserror::Error;

/// Validation and contract errors exposed by `fxstat-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("currency code cannot be empty")]
    EmptyCurrency,
    #[error("currency must be a 3-letter ISO code: '{value}'")]
    InvalidCurrency { value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
