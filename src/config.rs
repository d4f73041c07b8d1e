//! Engine configuration
//!
//! Every tunable constant in the load and adjustment pipeline lives here so
//! coaches can recalibrate without touching code. Defaults are the
//! documented calibration; a partial TOML file in the platform config
//! directory overrides individual sections.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Universal load derivation constants
    pub load: LoadConfig,

    /// Replacement-credit saturation constants
    pub credit: CreditConfig,

    /// Candidate scoring weights
    pub scoring: ScoringConfig,

    /// Budgeted adjustment builder rules
    pub adjustment: AdjustmentConfig,

    /// Severity classification thresholds
    pub severity: SeverityConfig,
}

/// Constants for tiered universal load computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Confidence assigned to sensor-measured load
    pub sensor_confidence: f64,

    /// Minimum zone-minutes required before the heart rate tier applies
    pub hr_min_zone_minutes: f64,

    /// Minimum fraction of the duration the zone data must cover
    pub hr_min_coverage: f64,

    /// Coverage fraction above which the higher HR confidence applies
    pub hr_full_coverage: f64,

    /// Confidence for full vs partial zone coverage
    pub hr_confidence_full: f64,
    pub hr_confidence_partial: f64,

    /// Per-minute load weight for each heart rate zone, 1 through 5
    pub zone_weights: [f64; 5],

    /// Per-minute load for RPE 1 through 10
    pub rpe_load_per_minute: [f64; 10],

    /// Aerobic fraction of load for RPE 1 through 10
    pub rpe_aerobic_fraction: [f64; 10],

    /// Discount applied to all RPE-derived loads for self-report noise
    pub rpe_uncertainty_penalty: f64,

    /// Confidence for mid-scale RPE (5-7), the tails, and a missing RPE
    pub rpe_confidence_mid: f64,
    pub rpe_confidence_tail: f64,
    pub rpe_confidence_missing: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            sensor_confidence: 0.90,
            hr_min_zone_minutes: 5.0,
            hr_min_coverage: 0.50,
            hr_full_coverage: 0.85,
            hr_confidence_full: 0.85,
            hr_confidence_partial: 0.70,
            zone_weights: [1.0, 1.8, 2.6, 3.6, 4.6],
            rpe_load_per_minute: [0.30, 0.45, 0.55, 0.75, 1.00, 1.25, 1.60, 2.00, 2.45, 3.00],
            rpe_aerobic_fraction: [0.97, 0.95, 0.93, 0.90, 0.85, 0.78, 0.70, 0.58, 0.45, 0.35],
            rpe_uncertainty_penalty: 0.90,
            rpe_confidence_mid: 0.65,
            rpe_confidence_tail: 0.55,
            rpe_confidence_missing: 0.45,
        }
    }
}

/// Constants shaping the saturating run-replacement credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditConfig {
    /// Asymptote of the saturation curve; no session can ever be credited
    /// more replacement than this
    pub credit_max: f64,

    /// Time constant of the saturation curve
    pub tau: f64,

    /// Goal-factor slope against the anaerobic ratio
    pub goal_factor_slope: f64,

    /// Goal-factor intercepts for endurance and short-race goals
    pub endurance_intercept: f64,
    pub short_race_intercept: f64,

    /// Load of one kilometer of easy running, for equivalence messaging
    pub easy_load_per_km: f64,

    /// Cap on the displayed equivalent easy distance, km
    pub equivalent_km_cap: f64,
}

impl Default for CreditConfig {
    fn default() -> Self {
        CreditConfig {
            credit_max: 60.0,
            tau: 45.0,
            goal_factor_slope: 0.35,
            endurance_intercept: 1.10,
            short_race_intercept: 0.90,
            easy_load_per_km: 6.0,
            equivalent_km_cap: 8.0,
        }
    }
}

/// Candidate scoring weights and modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the aerobic/anaerobic ratio match
    pub ratio_weight: f64,

    /// Weight of the load-magnitude match
    pub load_weight: f64,

    /// Smoothing constant in the load-distance score
    pub load_smoothing: f64,

    /// Anaerobic load counts this much more for fatigue equivalence
    pub anaerobic_weight: f64,

    /// Bonus when activity and run share a day
    pub same_day_bonus: f64,

    /// Penalty for targeting the long run
    pub long_run_penalty: f64,

    /// Penalty per unit of goal-specific protection priority
    pub protection_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            ratio_weight: 0.6,
            load_weight: 0.4,
            load_smoothing: 30.0,
            anaerobic_weight: 1.5,
            same_day_bonus: 0.10,
            long_run_penalty: 0.15,
            protection_penalty: 0.05,
        }
    }
}

/// Rules for the budgeted adjustment builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentConfig {
    /// Budget below which another edit is not worth proposing
    pub min_worthwhile_load: f64,

    /// Fraction of planned runs that must remain untouched by full
    /// replacement, and the absolute minimum count
    pub preserve_fraction: f64,
    pub preserve_min_runs: usize,

    /// Remaining budget must cover this fraction of an easy run's load
    /// before a full replacement is allowed
    pub replace_threshold: f64,

    /// Minimum confidence before any full replacement is allowed
    pub replace_min_confidence: f64,

    /// Maximum fractional cut and floor distance (km) for easy runs
    pub easy_max_cut: f64,
    pub easy_floor_km: f64,

    /// Maximum fractional cut, absolute floor (km), and fraction-of-original
    /// floor for long runs
    pub long_max_cut: f64,
    pub long_floor_km: f64,
    pub long_floor_fraction: f64,

    /// Remaining budget must cover this fraction of a quality run's load
    /// before an extreme session may replace it outright
    pub quality_replace_threshold: f64,

    /// Distance of the shakeout that substitutes a replaced quality run, km
    pub shakeout_km: f64,

    /// Assumed easy-running load per km when a run's distance must be
    /// estimated from its planned load
    pub estimated_easy_load_per_km: f64,

    /// Tolerance on budget conservation checks
    pub budget_epsilon: f64,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        AdjustmentConfig {
            min_worthwhile_load: 8.0,
            preserve_fraction: 0.55,
            preserve_min_runs: 2,
            replace_threshold: 0.95,
            replace_min_confidence: 0.75,
            easy_max_cut: 0.45,
            easy_floor_km: 3.0,
            long_max_cut: 0.25,
            long_floor_km: 8.0,
            long_floor_fraction: 0.70,
            quality_replace_threshold: 0.80,
            shakeout_km: 3.0,
            estimated_easy_load_per_km: 6.0,
            budget_epsilon: 0.01,
        }
    }
}

/// Severity classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityConfig {
    /// Fatigue cost over weekly planned load at or above which the
    /// session is extreme / heavy
    pub extreme_ratio: f64,
    pub heavy_ratio: f64,

    /// Duration+RPE fallback floors for subjective-only sessions
    pub extreme_fallback_minutes: f64,
    pub extreme_fallback_rpe: u8,
    pub heavy_fallback_minutes: f64,
    pub heavy_fallback_rpe: u8,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        SeverityConfig {
            extreme_ratio: 0.55,
            heavy_ratio: 0.25,
            extreme_fallback_minutes: 120.0,
            extreme_fallback_rpe: 7,
            heavy_fallback_minutes: 90.0,
            heavy_fallback_rpe: 6,
        }
    }
}

impl EngineConfig {
    /// Default path: `<platform config dir>/crossload/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crossload").join("config.toml"))
    }

    /// Load configuration from a TOML file. Missing sections keep their
    /// defaults via `#[serde(default)]`.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when no
    /// file exists.
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Write the configuration as TOML, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
