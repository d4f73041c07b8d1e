use chrono::Weekday;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sports that can appear as logged cross-training activities
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Cycling,
    Swimming,
    Rowing,
    Soccer,
    Rugby,
    Basketball,
    Tennis,
    Padel,
    Boxing,
    MartialArts,
    Hiking,
    Climbing,
    StrengthTraining,
    Yoga,
    Skiing,
    Skating,
    /// Anything the profile table does not know about
    Other(String),
}

impl Sport {
    /// Parse a user-facing sport label. Unrecognized labels map to
    /// `Other` so an unknown sport is never an error.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "cycling" | "bike" | "biking" => Sport::Cycling,
            "swimming" | "swim" => Sport::Swimming,
            "rowing" | "row" => Sport::Rowing,
            "soccer" | "football" => Sport::Soccer,
            "rugby" => Sport::Rugby,
            "basketball" => Sport::Basketball,
            "tennis" => Sport::Tennis,
            "padel" => Sport::Padel,
            "boxing" => Sport::Boxing,
            "martial_arts" | "martial-arts" | "mma" | "judo" | "bjj" => Sport::MartialArts,
            "hiking" | "hike" => Sport::Hiking,
            "climbing" | "bouldering" => Sport::Climbing,
            "strength" | "strength_training" | "gym" | "weights" => Sport::StrengthTraining,
            "yoga" | "pilates" => Sport::Yoga,
            "skiing" | "ski" | "xc_skiing" => Sport::Skiing,
            "skating" | "inline_skating" => Sport::Skating,
            other => Sport::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Sport::Other(name) => name.clone(),
            other => format!("{:?}", other).to_lowercase(),
        }
    }
}

/// Workout categories used in the weekly running plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutCategory {
    Easy,
    Long,
    Threshold,
    Vo2Max,
    Intervals,
    HillRepeats,
    MarathonPace,
    RacePace,
    Mixed,
    Progressive,
    Recovery,
}

impl WorkoutCategory {
    /// Quality sessions carry an intensity component beyond easy running
    pub fn is_quality(&self) -> bool {
        matches!(
            self,
            WorkoutCategory::Threshold
                | WorkoutCategory::Vo2Max
                | WorkoutCategory::Intervals
                | WorkoutCategory::HillRepeats
                | WorkoutCategory::MarathonPace
                | WorkoutCategory::RacePace
                | WorkoutCategory::Mixed
                | WorkoutCategory::Progressive
        )
    }

    /// One rung down on the intensity ladder, if a rung exists
    pub fn downgraded(&self) -> Option<WorkoutCategory> {
        match self {
            WorkoutCategory::Vo2Max
            | WorkoutCategory::Intervals
            | WorkoutCategory::HillRepeats => Some(WorkoutCategory::Threshold),
            WorkoutCategory::Threshold | WorkoutCategory::Mixed | WorkoutCategory::Progressive => {
                Some(WorkoutCategory::MarathonPace)
            }
            WorkoutCategory::MarathonPace | WorkoutCategory::RacePace => {
                Some(WorkoutCategory::Easy)
            }
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkoutCategory::Easy => "easy run",
            WorkoutCategory::Long => "long run",
            WorkoutCategory::Threshold => "threshold",
            WorkoutCategory::Vo2Max => "VO2max",
            WorkoutCategory::Intervals => "intervals",
            WorkoutCategory::HillRepeats => "hill repeats",
            WorkoutCategory::MarathonPace => "marathon pace",
            WorkoutCategory::RacePace => "race pace",
            WorkoutCategory::Mixed => "mixed",
            WorkoutCategory::Progressive => "progressive",
            WorkoutCategory::Recovery => "recovery jog",
        }
    }
}

/// Goal race distance, used to bias credit and workout protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalRace {
    FiveK,
    TenK,
    HalfMarathon,
    Marathon,
}

impl GoalRace {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "5k" => Some(GoalRace::FiveK),
            "10k" => Some(GoalRace::TenK),
            "half" | "half_marathon" | "half-marathon" | "hm" => Some(GoalRace::HalfMarathon),
            "marathon" | "full" => Some(GoalRace::Marathon),
            _ => None,
        }
    }

    /// Endurance goals reward aerobic-dominant cross-training
    pub fn is_endurance(&self) -> bool {
        matches!(self, GoalRace::HalfMarathon | GoalRace::Marathon)
    }
}

/// Sensor-measured load pair, straight from a watch or platform export
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorLoad {
    pub aerobic: f64,
    pub anaerobic: f64,
}

impl SensorLoad {
    pub fn total(&self) -> f64 {
        self.aerobic + self.anaerobic
    }
}

/// Minutes spent in each of the five heart rate zones
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneTimes {
    pub zone1_min: f64,
    pub zone2_min: f64,
    pub zone3_min: f64,
    pub zone4_min: f64,
    pub zone5_min: f64,
}

impl ZoneTimes {
    pub fn total_minutes(&self) -> f64 {
        self.zone1_min + self.zone2_min + self.zone3_min + self.zone4_min + self.zone5_min
    }
}

/// One logged cross-training session. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInput {
    /// Sport of the logged session
    pub sport: Sport,

    /// Session duration in minutes
    pub duration_min: f64,

    /// Subjective intensity rating 1-10, if the athlete provided one
    pub rpe: Option<u8>,

    /// Sensor-measured aerobic/anaerobic load, if available
    pub sensor: Option<SensorLoad>,

    /// Heart rate time-in-zone breakdown, if available
    pub zones: Option<ZoneTimes>,

    /// Day of the week the session happened
    pub day: Weekday,

    /// Free-form athlete notes
    pub notes: Option<String>,
}

/// Lifecycle status of a planned run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Planned,
    Reduced,
    Replaced,
    Skipped,
}

/// One workout slot in the weekly running plan. Owned by the caller;
/// the engine reads it and returns edits as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRun {
    /// Identifier within the plan (unique together with `day`)
    pub id: String,

    /// Day of the week this run is scheduled on
    pub day: Weekday,

    /// Workout category
    pub category: WorkoutCategory,

    /// Free-form workout description, e.g. "6x800m @ 5k pace"
    pub description: String,

    /// Planned distance in meters
    pub distance_m: Decimal,

    /// Planned aerobic load
    pub aerobic_load: f64,

    /// Planned anaerobic load
    pub anaerobic_load: f64,

    /// Current status
    pub status: RunStatus,
}

impl PlannedRun {
    pub fn is_long_run(&self) -> bool {
        self.category == WorkoutCategory::Long
    }

    pub fn is_quality(&self) -> bool {
        self.category.is_quality()
    }

    pub fn total_load(&self) -> f64 {
        self.aerobic_load + self.anaerobic_load
    }

    /// Anaerobic share of this run's planned load
    pub fn anaerobic_ratio(&self) -> f64 {
        let total = self.total_load();
        if total <= 0.0 {
            0.0
        } else {
            self.anaerobic_load / total
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_m.to_f64().unwrap_or(0.0) / 1000.0
    }
}

/// Athlete context the adjustment engine needs beyond the plan itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteContext {
    /// Goal race distance for the current training block
    pub goal: GoalRace,

    /// Injury-management mode relaxes long-run protection
    pub injury_mode: bool,
}

/// Action kind of a single proposed plan change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    /// Keep the slot and distance, drop one rung of intensity
    Downgrade,
    /// Keep the slot, shorten the distance
    Reduce,
    /// Substitute the workout (shakeout or full skip)
    Replace,
}

/// One proposed change to the plan. Pure output value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEdit {
    /// Target workout id
    pub run_id: String,

    /// Target workout day (plans can repeat ids on different days)
    pub day: Weekday,

    /// What kind of change this is
    pub action: EditAction,

    /// Category before the edit
    pub original_category: WorkoutCategory,

    /// Category after the edit
    pub new_category: WorkoutCategory,

    /// Distance before the edit, meters
    pub original_distance_m: Decimal,

    /// Distance after the edit, meters
    pub new_distance_m: Decimal,

    /// Load this edit spends from the outcome's budget
    pub load_reduction: f64,

    /// Human-readable reason for the edit
    pub rationale: String,
}

impl PlanEdit {
    /// A full skip removes the entire workout
    pub fn is_full_skip(&self) -> bool {
        self.action == EditAction::Replace && self.new_distance_m == Decimal::ZERO
    }
}

/// Severity of a logged session relative to the planned running week
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Light,
    Heavy,
    Extreme,
}

impl Severity {
    /// Cap on how many edits one logged session may propose
    pub fn max_edits(&self) -> usize {
        match self {
            Severity::Light => 1,
            Severity::Heavy => 2,
            Severity::Extreme => 3,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Severity::Light => "light session, minor plan impact",
            Severity::Heavy => "heavy session, noticeable plan impact",
            Severity::Extreme => "extreme session, major plan impact",
        }
    }
}
