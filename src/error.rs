//! Error types
//!
//! Configuration is validated when presets, reels and sequencers are built so
//! that nothing invalid reaches a running animation.

use std::path::PathBuf;

/// Rejected configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a finite, non-negative duration in ms (got {value})")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("{field} must be finite and non-negative (got {value})")]
    InvalidParameter { field: &'static str, value: f64 },

    #[error("symbol height must be a positive pixel size (got {0})")]
    InvalidSymbolHeight(f64),

    #[error("a sequencer needs at least one reel")]
    NoReels,

    #[error("unknown speed mode: {0}")]
    UnknownMode(String),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Rejected timeline edit
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("no timeline block with id {0}")]
    UnknownBlock(String),

    #[error("block duration must be finite and non-negative (got {0})")]
    InvalidDuration(f64),
}

/// Rejected edit coming from the timeline editor
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

/// Validate a millisecond duration
pub(crate) fn check_duration(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}

/// Validate a non-negative scalar parameter
pub(crate) fn check_parameter(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter { field, value })
    }
}
