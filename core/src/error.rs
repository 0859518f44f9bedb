use thiserror::Error;

#[derive(Error, Debug)]
pub enum DnaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),

    #[error("{field} of {value} exceeds the maximum of {max}")]
    InputOutOfBounds {
        field: &'static str,
        value: f64,
        max:   f64,
    },

    #[error("Insufficient balance: available {available:.2}, requested {requested:.2}")]
    InsufficientBalance { available: f64, requested: f64 },

    #[error("Maximum of {max} live support contacts reached for this session")]
    SupportLimitReached { max: u32 },

    #[error("Customer profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("Feature mismatch: expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Model error: {0}")]
    Model(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DnaResult<T> = Result<T, DnaError>;
