//! Per-sport coefficient table
//!
//! Static reference data describing how each cross-training sport maps onto
//! running load: a sport-wide effort multiplier, how much of its load
//! transfers to running fitness, how much it costs in recovery regardless of
//! transfer, what fraction of the clock is truly active, and which workout
//! categories the sport may never touch in a plan.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Sport, WorkoutCategory};

/// Coefficients for one sport. Looked up, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportProfile {
    /// Sport-wide effort multiplier applied to RPE-derived load
    pub intensity_mult: f64,

    /// Fraction of this sport's load that transfers to running fitness (0-1)
    pub running_specificity: f64,

    /// Fatigue cost multiplier, independent of transfer
    pub recovery_mult: f64,

    /// Fraction of the elapsed session that is truly active;
    /// discounts intermittent sports relative to continuous ones
    pub active_fraction: f64,

    /// Workout categories this sport may never modify
    pub untouchable: Vec<WorkoutCategory>,
}

impl SportProfile {
    /// Conservative profile used for sports the table does not know
    pub fn conservative_default() -> Self {
        SportProfile {
            intensity_mult: 1.0,
            running_specificity: 0.35,
            recovery_mult: 1.0,
            active_fraction: 0.85,
            untouchable: Vec::new(),
        }
    }
}

fn profile(
    intensity_mult: f64,
    running_specificity: f64,
    recovery_mult: f64,
    active_fraction: f64,
    untouchable: Vec<WorkoutCategory>,
) -> SportProfile {
    SportProfile {
        intensity_mult,
        running_specificity,
        recovery_mult,
        active_fraction,
        untouchable,
    }
}

fn build_profile_table() -> HashMap<Sport, SportProfile> {
    let mut table = HashMap::new();

    // Continuous aerobic sports: high transfer, near-full active time.
    // Cycling never stands in for a quality running session.
    table.insert(
        Sport::Cycling,
        profile(0.95, 0.55, 0.85, 0.95, vec![WorkoutCategory::Vo2Max, WorkoutCategory::Intervals]),
    );
    table.insert(Sport::Swimming, profile(0.95, 0.40, 0.75, 0.90, Vec::new()));
    table.insert(Sport::Rowing, profile(1.00, 0.50, 0.90, 0.90, Vec::new()));
    table.insert(Sport::Skiing, profile(1.00, 0.55, 0.95, 0.90, Vec::new()));
    table.insert(Sport::Skating, profile(0.95, 0.50, 0.85, 0.90, Vec::new()));
    table.insert(Sport::Hiking, profile(0.80, 0.45, 0.80, 0.95, Vec::new()));

    // Field and court sports: intermittent, high impact, moderate transfer
    table.insert(Sport::Soccer, profile(1.10, 0.50, 1.20, 0.70, Vec::new()));
    table.insert(Sport::Rugby, profile(1.15, 0.40, 1.35, 0.65, Vec::new()));
    table.insert(Sport::Basketball, profile(1.05, 0.45, 1.15, 0.65, Vec::new()));
    table.insert(Sport::Tennis, profile(1.00, 0.35, 1.00, 0.60, Vec::new()));
    table.insert(Sport::Padel, profile(0.95, 0.30, 0.95, 0.60, Vec::new()));

    // Combat sports: hard on the whole body, little running transfer
    table.insert(Sport::Boxing, profile(1.10, 0.30, 1.15, 0.70, Vec::new()));
    table.insert(Sport::MartialArts, profile(1.10, 0.25, 1.20, 0.65, Vec::new()));

    // Gym work: negligible aerobic transfer but real recovery cost.
    // Strength never earns credit against a quality running session.
    table.insert(
        Sport::StrengthTraining,
        profile(
            0.90,
            0.10,
            1.10,
            0.50,
            vec![
                WorkoutCategory::Threshold,
                WorkoutCategory::Vo2Max,
                WorkoutCategory::Intervals,
                WorkoutCategory::Long,
            ],
        ),
    );
    table.insert(Sport::Climbing, profile(0.95, 0.15, 1.05, 0.55, Vec::new()));
    table.insert(
        Sport::Yoga,
        profile(
            0.60,
            0.05,
            0.50,
            0.80,
            vec![
                WorkoutCategory::Threshold,
                WorkoutCategory::Vo2Max,
                WorkoutCategory::Intervals,
                WorkoutCategory::Long,
            ],
        ),
    );

    table
}

/// Sport profile lookup with default-on-miss fallback
pub struct SportProfileTable {
    profiles: HashMap<Sport, SportProfile>,
    default_profile: SportProfile,
}

impl SportProfileTable {
    pub fn new() -> Self {
        SportProfileTable {
            profiles: build_profile_table(),
            default_profile: SportProfile::conservative_default(),
        }
    }

    /// Look up a sport's coefficients. Unknown sports get the
    /// conservative default, never an error.
    pub fn get(&self, sport: &Sport) -> &SportProfile {
        self.profiles.get(sport).unwrap_or(&self.default_profile)
    }

    /// True if this sport is barred from modifying the given category
    pub fn is_untouchable(&self, sport: &Sport, category: WorkoutCategory) -> bool {
        self.get(sport).untouchable.contains(&category)
    }
}

impl Default for SportProfileTable {
    fn default() -> Self {
        Self::new()
    }
}
