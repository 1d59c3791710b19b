//! qfol-core: Shared types, configuration, and error handling for the QFOL analyzer.
//!
//! This crate provides the foundational types used by the Quantum-Fractal
//! Operating Loop:
//! - Interaction events (query, response, action, feedback) and their payloads
//! - The three metric groups (DEI, HIG, EEG) attached to each event
//! - Threshold and retention configuration
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::{QfolConfig, Thresholds};
pub use error::QfolError;
pub use events::{EventData, EventId, EventType, NewEvent, QfolEvent, UserFeedback};
pub use types::{DeiMetrics, EegMetrics, HigMetrics, QfolMetrics};
