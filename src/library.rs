//! Workout library seam
//!
//! The surrounding application owns the real pace math and workout
//! description parsing. The engine consumes both through the narrow
//! `WorkoutLibrary` trait and ships a table-driven `StandardLibrary` so the
//! CLI and the test suite are self-contained.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::WorkoutCategory;

/// Aerobic/anaerobic load pair for one workout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLoad {
    pub aerobic: f64,
    pub anaerobic: f64,
}

impl WorkoutLoad {
    pub const ZERO: WorkoutLoad = WorkoutLoad {
        aerobic: 0.0,
        anaerobic: 0.0,
    };

    pub fn total(&self) -> f64 {
        self.aerobic + self.anaerobic
    }
}

/// Narrow interface to the external workout math library
pub trait WorkoutLibrary {
    /// Compute the aerobic/anaerobic load of a workout of the given
    /// category run over the given distance
    fn compute_workout_load(
        &self,
        category: WorkoutCategory,
        description: &str,
        distance_m: Decimal,
    ) -> WorkoutLoad;

    /// Parse a free-form workout description into a distance in meters.
    /// Returns `None` when the description cannot be parsed; callers fall
    /// back to estimating from load, never to an error.
    fn parse_workout_distance(&self, description: &str) -> Option<Decimal>;
}

/// Per-kilometer load densities by workout category. A stand-in for the
/// full VDOT-based math, calibrated so an easy kilometer costs 6.0 load.
#[derive(Debug, Clone, Default)]
pub struct StandardLibrary;

impl StandardLibrary {
    pub fn new() -> Self {
        StandardLibrary
    }

    /// (aerobic, anaerobic) load per kilometer for each category
    fn density(category: WorkoutCategory) -> (f64, f64) {
        match category {
            WorkoutCategory::Recovery => (4.5, 0.0),
            WorkoutCategory::Easy => (5.5, 0.5),
            WorkoutCategory::Long => (6.0, 0.5),
            WorkoutCategory::MarathonPace => (7.0, 1.5),
            WorkoutCategory::Progressive => (6.5, 2.0),
            WorkoutCategory::Mixed => (7.0, 2.5),
            WorkoutCategory::RacePace => (7.5, 3.0),
            WorkoutCategory::Threshold => (7.5, 3.5),
            WorkoutCategory::HillRepeats => (7.0, 4.5),
            WorkoutCategory::Intervals => (7.0, 5.0),
            WorkoutCategory::Vo2Max => (7.0, 5.5),
        }
    }
}

impl WorkoutLibrary for StandardLibrary {
    fn compute_workout_load(
        &self,
        category: WorkoutCategory,
        _description: &str,
        distance_m: Decimal,
    ) -> WorkoutLoad {
        let km = distance_m.to_f64().unwrap_or(0.0).max(0.0) / 1000.0;
        let (aerobic_per_km, anaerobic_per_km) = Self::density(category);
        WorkoutLoad {
            aerobic: aerobic_per_km * km,
            anaerobic: anaerobic_per_km * km,
        }
    }

    fn parse_workout_distance(&self, description: &str) -> Option<Decimal> {
        parse_distance_meters(description).and_then(Decimal::from_f64)
    }
}

/// Parse the first recognizable distance expression in a description.
/// Handles plain distances ("12 km", "8000m") and simple interval sets
/// ("6x800m", "3 x 2km"). Time-based sessions parse to `None`.
fn parse_distance_meters(description: &str) -> Option<f64> {
    let text = description.to_lowercase();

    if let Some(total) = parse_interval_set(&text) {
        return Some(total);
    }

    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if !c.is_ascii_digit() {
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(idx, nc)) = chars.peek() {
            if nc.is_ascii_digit() || nc == '.' {
                end = idx + nc.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let value: f64 = match text[start..end].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        let rest = text[end..].trim_start();
        if rest.starts_with("km") || rest.starts_with("k ") || rest == "k" {
            return Some(value * 1000.0);
        }
        if rest.starts_with("mi") {
            return Some(value * 1609.34);
        }
        // Bare "m" only when it is not the start of "min"
        if rest.starts_with('m') && !rest.starts_with("mi") && !rest.starts_with("min") {
            return Some(value);
        }
    }
    None
}

/// Parse "AxB<unit>" interval notation into total meters
fn parse_interval_set(text: &str) -> Option<f64> {
    let x_pos = text.find('x')?;
    let before = text[..x_pos].trim_end();
    let reps: f64 = before
        .rsplit(|c: char| !c.is_ascii_digit())
        .next()
        .filter(|s| !s.is_empty())?
        .parse()
        .ok()?;

    let after = text[x_pos + 1..].trim_start();
    let num_end = after
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(after.len());
    let each: f64 = after[..num_end].parse().ok()?;
    let unit = after[num_end..].trim_start();

    if unit.starts_with("km") {
        Some(reps * each * 1000.0)
    } else if unit.starts_with('m') && !unit.starts_with("mi") && !unit.starts_with("min") {
        Some(reps * each)
    } else {
        None
    }
}
