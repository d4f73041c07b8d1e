//! Unified error hierarchy for crossload
//!
//! The load and suggestion pipeline itself degrades instead of erroring:
//! unknown sports fall back to a conservative profile, missing sensor or
//! heart rate data falls through to the next tier, and zero-load activities
//! produce empty edit sets. The variants here cover the few genuine failure
//! cases: ambiguous caller plans, configuration problems, and I/O at the
//! CLI boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for crossload operations
#[derive(Debug, Error)]
pub enum CrossloadError {
    /// Plan-adjustment precondition violations
    #[error("Adjustment error: {0}")]
    Adjustment(#[from] AdjustmentError),

    /// Configuration file problems
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors (CLI boundary only)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload serialization errors (CLI boundary only)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Plan-adjustment errors. The only hard error in the engine is a plan the
/// interface layer should never have produced.
#[derive(Debug, Error)]
pub enum AdjustmentError {
    /// The caller's plan contains duplicate (id, day) pairs that cannot
    /// be disambiguated when matching edits to workouts
    #[error("Ambiguous plan: duplicate workout ({id}, {day}) cannot be disambiguated")]
    AmbiguousPlan { id: String, day: String },

    /// An edit references a workout the plan does not contain
    #[error("Edit targets unknown workout ({id}, {day})")]
    UnknownTarget { id: String, day: String },
}

/// Configuration-specific context for file handling
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Config parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

impl From<ConfigFileError> for CrossloadError {
    fn from(err: ConfigFileError) -> Self {
        CrossloadError::Configuration(err.to_string())
    }
}

/// Result type alias for crossload operations
pub type Result<T> = std::result::Result<T, CrossloadError>;

impl CrossloadError {
    /// Map to a tracing level for consistent log output
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            CrossloadError::Adjustment(_) => tracing::Level::ERROR,
            CrossloadError::Configuration(_) => tracing::Level::WARN,
            CrossloadError::Io(_) | CrossloadError::Serialization(_) => tracing::Level::WARN,
            CrossloadError::Internal(_) => tracing::Level::ERROR,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CrossloadError::Adjustment(AdjustmentError::AmbiguousPlan { id, day }) => format!(
                "The weekly plan has two workouts named '{}' on {}. Give each workout a unique name per day.",
                id, day
            ),
            CrossloadError::Configuration(reason) => {
                format!("Configuration problem: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}
