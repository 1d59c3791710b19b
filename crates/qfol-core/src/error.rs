use thiserror::Error;

/// Top-level error type for the QFOL core crate.
#[derive(Error, Debug)]
pub enum QfolError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for QfolError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
