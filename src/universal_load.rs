//! Universal load computation
//!
//! Derives one comparable load value from a logged activity regardless of
//! data quality. Three tiers, best first: sensor-measured aerobic/anaerobic
//! load, a zone-weighted heart rate estimate, and a subjective RPE model.
//! The tier is resolved once into a `LoadTier`; everything downstream works
//! on the single normalized `UniversalLoadResult` shape.
//!
//! Two derived values matter to the adjustment engine:
//! - the fatigue cost load (FCL) is unsaturated so reduction decisions
//!   never under-react to very large sessions;
//! - the run replacement credit (RRC) saturates toward `credit_max` so no
//!   single session can erase a week of running stimulus.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CreditConfig, LoadConfig};
use crate::models::{ActivityInput, GoalRace};
use crate::sport_profile::{SportProfile, SportProfileTable};

/// Data-quality tier used for one load computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadTier {
    /// Sensor-measured aerobic/anaerobic load used directly
    Sensor,
    /// Zone-weighted heart rate estimate
    HeartRate,
    /// Subjective effort model
    Rpe,
    /// Nothing usable; zero load
    None,
}

impl LoadTier {
    pub fn description(&self) -> &'static str {
        match self {
            LoadTier::Sensor => "measured by device",
            LoadTier::HeartRate => "estimated from heart rate zones",
            LoadTier::Rpe => "estimated from perceived effort",
            LoadTier::None => "no usable data",
        }
    }
}

/// Normalized load derivation for one activity. Computed fresh on every
/// call; never cached or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalLoadResult {
    pub aerobic_load: f64,
    pub anaerobic_load: f64,

    /// Sum of the aerobic and anaerobic components
    pub base_load: f64,

    /// Unsaturated physiological cost; drives downgrades and reductions
    pub fatigue_cost_load: f64,

    /// Saturated, goal-adjusted credit; drives full replacements
    pub run_replacement_credit: f64,

    /// Data tier the computation used
    pub tier: LoadTier,

    /// Confidence in the derivation, 0-1
    pub confidence: f64,

    /// Equivalent kilometers of easy running, for messaging only
    pub equivalent_easy_km: f64,

    /// Human-readable derivation notes
    pub explanations: Vec<String>,
}

impl UniversalLoadResult {
    /// Anaerobic share of the base load
    pub fn anaerobic_ratio(&self) -> f64 {
        if self.base_load <= 0.0 {
            0.0
        } else {
            self.anaerobic_load / self.base_load
        }
    }

    pub fn is_zero(&self) -> bool {
        self.base_load <= 0.0
    }

    fn zero() -> Self {
        UniversalLoadResult {
            aerobic_load: 0.0,
            anaerobic_load: 0.0,
            base_load: 0.0,
            fatigue_cost_load: 0.0,
            run_replacement_credit: 0.0,
            tier: LoadTier::None,
            confidence: 0.0,
            equivalent_easy_km: 0.0,
            explanations: vec!["No usable duration or load data".to_string()],
        }
    }
}

/// Raw aerobic/anaerobic split with its tier and confidence, resolved once
/// before the credit math runs
struct TierResult {
    aerobic: f64,
    anaerobic: f64,
    tier: LoadTier,
    confidence: f64,
    note: String,
}

/// Universal load calculator
pub struct LoadCalculator<'a> {
    load_config: &'a LoadConfig,
    credit_config: &'a CreditConfig,
    profiles: &'a SportProfileTable,
}

impl<'a> LoadCalculator<'a> {
    pub fn new(
        load_config: &'a LoadConfig,
        credit_config: &'a CreditConfig,
        profiles: &'a SportProfileTable,
    ) -> Self {
        LoadCalculator {
            load_config,
            credit_config,
            profiles,
        }
    }

    /// Compute the universal load for one logged activity.
    ///
    /// Never errors: unknown sports get the conservative default profile,
    /// missing or insufficient data falls through to the next tier, and a
    /// zero-duration activity yields a zero-load result.
    pub fn compute(&self, activity: &ActivityInput, goal: GoalRace) -> UniversalLoadResult {
        if activity.duration_min <= 0.0 {
            return UniversalLoadResult::zero();
        }

        let profile = self.profiles.get(&activity.sport);

        let tier_result = self
            .try_sensor_tier(activity)
            .or_else(|| self.try_heart_rate_tier(activity))
            .unwrap_or_else(|| self.rpe_tier(activity, profile));

        debug!(
            sport = %activity.sport.label(),
            tier = ?tier_result.tier,
            aerobic = tier_result.aerobic,
            anaerobic = tier_result.anaerobic,
            "resolved load tier"
        );

        let base_load = tier_result.aerobic + tier_result.anaerobic;
        if base_load <= 0.0 {
            return UniversalLoadResult::zero();
        }

        let anaerobic_ratio = tier_result.anaerobic / base_load;
        let fatigue_cost_load = base_load * profile.recovery_mult;

        let goal_factor = goal_factor(self.credit_config, goal, anaerobic_ratio);
        let raw_credit = base_load * profile.running_specificity * goal_factor;
        let run_replacement_credit = saturate_credit(self.credit_config, raw_credit);

        let equivalent_easy_km = (run_replacement_credit / self.credit_config.easy_load_per_km)
            .min(self.credit_config.equivalent_km_cap);

        let mut explanations = vec![tier_result.note];
        explanations.push(format!(
            "Base load {:.0} ({:.0}% anaerobic), fatigue cost {:.0}",
            base_load,
            anaerobic_ratio * 100.0,
            fatigue_cost_load
        ));
        explanations.push(format!(
            "Counts like about {:.1} km of easy running toward this week",
            equivalent_easy_km
        ));

        UniversalLoadResult {
            aerobic_load: tier_result.aerobic,
            anaerobic_load: tier_result.anaerobic,
            base_load,
            fatigue_cost_load,
            run_replacement_credit,
            tier: tier_result.tier,
            confidence: tier_result.confidence,
            equivalent_easy_km,
            explanations,
        }
    }

    /// Sensor tier: use the measured split directly
    fn try_sensor_tier(&self, activity: &ActivityInput) -> Option<TierResult> {
        let sensor = activity.sensor.as_ref()?;
        if sensor.total() <= 0.0 {
            return None;
        }
        Some(TierResult {
            aerobic: sensor.aerobic.max(0.0),
            anaerobic: sensor.anaerobic.max(0.0),
            tier: LoadTier::Sensor,
            confidence: self.load_config.sensor_confidence,
            note: format!(
                "Device reported {:.0} aerobic / {:.0} anaerobic load",
                sensor.aerobic, sensor.anaerobic
            ),
        })
    }

    /// Heart rate tier: zone-weighted load, zones 1-3 aerobic, 4-5
    /// anaerobic. Requires enough zone minutes to mean something.
    fn try_heart_rate_tier(&self, activity: &ActivityInput) -> Option<TierResult> {
        let zones = activity.zones.as_ref()?;
        let covered = zones.total_minutes();
        if covered < self.load_config.hr_min_zone_minutes {
            return None;
        }
        let coverage = covered / activity.duration_min;
        if coverage < self.load_config.hr_min_coverage {
            return None;
        }

        let w = &self.load_config.zone_weights;
        let aerobic = zones.zone1_min * w[0] + zones.zone2_min * w[1] + zones.zone3_min * w[2];
        let anaerobic = zones.zone4_min * w[3] + zones.zone5_min * w[4];

        let confidence = if coverage >= self.load_config.hr_full_coverage {
            self.load_config.hr_confidence_full
        } else {
            self.load_config.hr_confidence_partial
        };

        Some(TierResult {
            aerobic,
            anaerobic,
            tier: LoadTier::HeartRate,
            confidence,
            note: format!(
                "Heart rate zones covered {:.0}% of the session",
                coverage * 100.0
            ),
        })
    }

    /// RPE tier: subjective fallback. A missing rating is treated as a
    /// moderate effort at reduced confidence rather than an error.
    fn rpe_tier(&self, activity: &ActivityInput, profile: &SportProfile) -> TierResult {
        let (rpe, confidence) = match activity.rpe {
            Some(r) => {
                let clamped = r.clamp(1, 10);
                let confidence = if (5..=7).contains(&clamped) {
                    self.load_config.rpe_confidence_mid
                } else {
                    self.load_config.rpe_confidence_tail
                };
                (clamped, confidence)
            }
            None => (5, self.load_config.rpe_confidence_missing),
        };

        let idx = (rpe - 1) as usize;
        let raw = activity.duration_min
            * self.load_config.rpe_load_per_minute[idx]
            * profile.intensity_mult
            * profile.active_fraction
            * self.load_config.rpe_uncertainty_penalty;

        let aerobic_fraction = self.load_config.rpe_aerobic_fraction[idx];

        TierResult {
            aerobic: raw * aerobic_fraction,
            anaerobic: raw * (1.0 - aerobic_fraction),
            tier: LoadTier::Rpe,
            confidence,
            note: format!(
                "Estimated from {:.0} min at RPE {} ({})",
                activity.duration_min,
                rpe,
                activity.sport.label()
            ),
        }
    }
}

/// Goal factor: credit what trains the current target. Endurance goals
/// reward aerobic-dominant sessions, short-race goals anaerobic-dominant
/// ones.
fn goal_factor(config: &CreditConfig, goal: GoalRace, anaerobic_ratio: f64) -> f64 {
    if goal.is_endurance() {
        config.endurance_intercept - config.goal_factor_slope * anaerobic_ratio
    } else {
        config.short_race_intercept + config.goal_factor_slope * anaerobic_ratio
    }
}

/// Saturating credit curve: asymptote `credit_max`, time constant `tau`.
/// Strictly increasing in the raw credit and bounded above.
fn saturate_credit(config: &CreditConfig, raw_credit: f64) -> f64 {
    if raw_credit <= 0.0 {
        return 0.0;
    }
    config.credit_max * (1.0 - (-raw_credit / config.tau).exp())
}

/// Convenience wrapper over `LoadCalculator` with default wiring
pub fn compute_universal_load(
    activity: &ActivityInput,
    goal: GoalRace,
    load_config: &LoadConfig,
    credit_config: &CreditConfig,
) -> UniversalLoadResult {
    let profiles = SportProfileTable::new();
    LoadCalculator::new(load_config, credit_config, &profiles).compute(activity, goal)
}
