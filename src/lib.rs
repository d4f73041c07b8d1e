// Library interface for the crossload engine
// This allows integration tests to access the core functionality

pub mod adjustment;
pub mod apply;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod scoring;
pub mod sport_profile;
pub mod suggestion;
pub mod universal_load;

// Re-export commonly used types for convenience
pub use models::*;
pub use adjustment::{AdjustmentBuilder, ChoiceOutcome, OutcomeKind};
pub use apply::apply_edits;
pub use config::EngineConfig;
pub use error::{AdjustmentError, CrossloadError, Result};
pub use library::{StandardLibrary, WorkoutLibrary, WorkoutLoad};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use scoring::{Candidate, CandidateScorer};
pub use sport_profile::{SportProfile, SportProfileTable};
pub use suggestion::{build_suggestion, SuggestionEngine, SuggestionPayload};
pub use universal_load::{compute_universal_load, LoadCalculator, LoadTier, UniversalLoadResult};
