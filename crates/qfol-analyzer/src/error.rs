//! Error types for the qfol-analyzer crate.
//!
//! Analyzer operations themselves are total; these errors come from the
//! request, report, and replay surfaces around them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Missing required fields: {fields}")]
    MissingFields { fields: String },

    #[error("Unknown event type: {event_type}")]
    UnknownEventType { event_type: String },

    #[error("Invalid action: {action}. Use: status, gate-check, or metrics-only")]
    InvalidAction { action: String },

    #[error("Core error: {0}")]
    Core(#[from] qfol_core::QfolError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
