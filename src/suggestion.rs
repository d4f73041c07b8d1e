//! Suggestion assembly
//!
//! Classifies how hard the logged session hit the week, runs the budgeted
//! builder once per outcome, and packages everything into the single
//! decision payload shown to the athlete. Nothing is applied here; the
//! payload is pure data and safe to recompute every time a preview opens.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adjustment::{AdjustmentBuilder, ChoiceOutcome, OutcomeKind};
use crate::config::{EngineConfig, SeverityConfig};
use crate::library::{StandardLibrary, WorkoutLibrary};
use crate::models::{ActivityInput, AthleteContext, PlannedRun, RunStatus, Severity};
use crate::scoring::CandidateScorer;
use crate::sport_profile::SportProfileTable;
use crate::universal_load::{LoadCalculator, LoadTier, UniversalLoadResult};

/// The complete decision payload for one logged activity. Immutable;
/// nothing touches the plan until the athlete picks an outcome and the
/// caller invokes the apply step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPayload {
    /// Label of the sport this suggestion answers, carried so the apply
    /// step can write sensible descriptions
    pub activity_sport: String,

    /// Severity of the session relative to the planned running week
    pub severity: Severity,

    /// Convenience flag for the extreme classification
    pub is_extreme: bool,

    /// The full load derivation behind the suggestion
    pub load: UniversalLoadResult,

    /// Do nothing
    pub keep: ChoiceOutcome,

    /// Downgrades and reductions only
    pub conservative: ChoiceOutcome,

    /// Replacement-capable allocation of the saturated credit
    pub recommended: ChoiceOutcome,

    /// Caveats the athlete should see alongside the options
    pub warnings: Vec<String>,
}

impl SuggestionPayload {
    pub fn outcome(&self, label: &str) -> Option<&ChoiceOutcome> {
        match label {
            "keep" => Some(&self.keep),
            "conservative" => Some(&self.conservative),
            "recommended" => Some(&self.recommended),
            _ => None,
        }
    }
}

/// Classify severity from the fatigue cost relative to the week's total
/// planned running load, with duration+RPE floor rules for subjective-only
/// sessions.
pub fn classify_severity(
    config: &SeverityConfig,
    load: &UniversalLoadResult,
    activity: &ActivityInput,
    weekly_planned_load: f64,
) -> Severity {
    let by_ratio = if weekly_planned_load > 0.0 {
        let ratio = load.fatigue_cost_load / weekly_planned_load;
        if ratio >= config.extreme_ratio {
            Severity::Extreme
        } else if ratio >= config.heavy_ratio {
            Severity::Heavy
        } else {
            Severity::Light
        }
    } else {
        Severity::Light
    };

    // Subjective-only sessions get a floor from duration and RPE so a
    // three-hour slog is never waved through as light
    if load.tier != LoadTier::Rpe {
        return by_ratio;
    }
    let rpe = activity.rpe.unwrap_or(5);
    let by_fallback = if activity.duration_min >= config.extreme_fallback_minutes
        && rpe >= config.extreme_fallback_rpe
    {
        Severity::Extreme
    } else if activity.duration_min >= config.heavy_fallback_minutes
        && rpe >= config.heavy_fallback_rpe
    {
        Severity::Heavy
    } else {
        Severity::Light
    };

    by_ratio.max(by_fallback)
}

/// Full suggestion pipeline wired from configuration
pub struct SuggestionEngine<'a> {
    config: &'a EngineConfig,
    profiles: SportProfileTable,
    library: &'a dyn WorkoutLibrary,
}

impl<'a> SuggestionEngine<'a> {
    pub fn new(config: &'a EngineConfig, library: &'a dyn WorkoutLibrary) -> Self {
        SuggestionEngine {
            config,
            profiles: SportProfileTable::new(),
            library,
        }
    }

    /// Build the decision payload for one logged activity against this
    /// week's plan. Pure: calling it repeatedly with the same inputs
    /// yields equal payloads and never touches the caller's data.
    pub fn suggest(
        &self,
        week_runs: &[PlannedRun],
        activity: &ActivityInput,
        context: &AthleteContext,
    ) -> SuggestionPayload {
        let calculator =
            LoadCalculator::new(&self.config.load, &self.config.credit, &self.profiles);
        let load = calculator.compute(activity, context.goal);

        let weekly_planned_load: f64 = week_runs
            .iter()
            .filter(|run| run.status == RunStatus::Planned)
            .map(|run| run.total_load())
            .sum();
        let planned_count = week_runs
            .iter()
            .filter(|run| run.status == RunStatus::Planned)
            .count();

        let severity = classify_severity(&self.config.severity, &load, activity, weekly_planned_load);
        debug!(
            severity = ?severity,
            fatigue_cost = load.fatigue_cost_load,
            weekly_planned_load,
            "classified session"
        );

        let scorer = CandidateScorer::new(&self.config.scoring, &self.profiles);
        let candidates = scorer.rank(week_runs, &load, &activity.sport, activity.day, context);

        let sport_label = activity.sport.label();
        let builder = AdjustmentBuilder::new(&self.config.adjustment, self.library);
        let conservative = builder.build(
            OutcomeKind::Conservative,
            &candidates,
            &load,
            severity,
            planned_count,
            &sport_label,
        );
        let recommended = builder.build(
            OutcomeKind::Recommended,
            &candidates,
            &load,
            severity,
            planned_count,
            &sport_label,
        );

        let warnings = self.collect_warnings(&load, &conservative, &recommended);

        SuggestionPayload {
            activity_sport: sport_label,
            severity,
            is_extreme: severity == Severity::Extreme,
            load,
            keep: ChoiceOutcome::keep(),
            conservative,
            recommended,
            warnings,
        }
    }

    fn collect_warnings(
        &self,
        load: &UniversalLoadResult,
        conservative: &ChoiceOutcome,
        recommended: &ChoiceOutcome,
    ) -> Vec<String> {
        let mut warnings = Vec::new();

        if load.tier == LoadTier::Rpe && !load.is_zero() {
            warnings.push(
                "Load estimated from perceived effort only; treat the numbers as rough".to_string(),
            );
        }
        if load.confidence < self.config.adjustment.replace_min_confidence
            && load.run_replacement_credit > self.config.adjustment.min_worthwhile_load
        {
            warnings.push(
                "Confidence too low to fully replace any run; offering reductions instead"
                    .to_string(),
            );
        }
        if conservative.replace_blocked_by_preserve || recommended.replace_blocked_by_preserve {
            warnings.push(
                "Some replacements were withheld to keep the minimum number of runs in the week"
                    .to_string(),
            );
        }

        warnings
    }
}

/// Convenience entry point with the bundled workout library
pub fn build_suggestion(
    week_runs: &[PlannedRun],
    activity: &ActivityInput,
    context: &AthleteContext,
    config: &EngineConfig,
) -> SuggestionPayload {
    let library = StandardLibrary::new();
    SuggestionEngine::new(config, &library).suggest(week_runs, activity, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::StandardLibrary;
    use crate::models::{EditAction, GoalRace, Sport, WorkoutCategory};
    use chrono::Weekday;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn run(id: &str, day: Weekday, category: WorkoutCategory, meters: Decimal) -> PlannedRun {
        let lib = StandardLibrary::new();
        let load = lib.compute_workout_load(category, "", meters);
        PlannedRun {
            id: id.to_string(),
            day,
            category,
            description: String::new(),
            distance_m: meters,
            aerobic_load: load.aerobic,
            anaerobic_load: load.anaerobic,
            status: RunStatus::Planned,
        }
    }

    fn week() -> Vec<PlannedRun> {
        vec![
            run("mon_easy", Weekday::Mon, WorkoutCategory::Easy, dec!(8000)),
            run("tue_threshold", Weekday::Tue, WorkoutCategory::Threshold, dec!(10000)),
            run("thu_easy", Weekday::Thu, WorkoutCategory::Easy, dec!(6000)),
            run("fri_easy", Weekday::Fri, WorkoutCategory::Easy, dec!(5000)),
            run("sun_long", Weekday::Sun, WorkoutCategory::Long, dec!(26000)),
        ]
    }

    fn activity(sport: Sport, duration_min: f64, rpe: u8, day: Weekday) -> ActivityInput {
        ActivityInput {
            sport,
            duration_min,
            rpe: Some(rpe),
            sensor: None,
            zones: None,
            day,
            notes: None,
        }
    }

    fn context() -> AthleteContext {
        AthleteContext {
            goal: GoalRace::Marathon,
            injury_mode: false,
        }
    }

    #[test]
    fn test_three_hour_soccer_is_extreme() {
        let config = EngineConfig::default();
        let payload = build_suggestion(
            &week(),
            &activity(Sport::Soccer, 180.0, 8, Weekday::Sat),
            &context(),
            &config,
        );
        assert_eq!(payload.severity, Severity::Extreme);
        assert!(payload.is_extreme);
        assert!(payload.recommended.edits.len() <= 3);
        // The long run survives in every outcome
        for outcome in [&payload.conservative, &payload.recommended] {
            assert!(outcome
                .edits
                .iter()
                .all(|e| !(e.run_id == "sun_long" && e.action == EditAction::Replace)));
        }
    }

    #[test]
    fn test_light_session_barely_touches_week() {
        let config = EngineConfig::default();
        let payload = build_suggestion(
            &week(),
            &activity(Sport::Yoga, 40.0, 3, Weekday::Wed),
            &context(),
            &config,
        );
        assert_eq!(payload.severity, Severity::Light);
        assert!(payload.conservative.edits.len() <= 1);
        assert!(payload.recommended.edits.len() <= 1);
    }

    #[test]
    fn test_duration_rpe_fallback_floors_severity() {
        let config = EngineConfig::default();
        // Small plan, so the ratio alone would call this heavy at most;
        // an empty plan exercises the pure fallback path
        let payload = build_suggestion(
            &[],
            &activity(Sport::Padel, 130.0, 8, Weekday::Sat),
            &context(),
            &config,
        );
        assert_eq!(payload.severity, Severity::Extreme);
        assert!(payload.recommended.edits.is_empty());
    }

    #[test]
    fn test_rpe_only_warns_and_never_replaces() {
        let config = EngineConfig::default();
        let payload = build_suggestion(
            &week(),
            &activity(Sport::Rugby, 90.0, 8, Weekday::Sat),
            &context(),
            &config,
        );
        assert!(payload
            .warnings
            .iter()
            .any(|w| w.contains("perceived effort")));
        assert!(payload
            .recommended
            .edits
            .iter()
            .all(|e| e.action != EditAction::Replace));
    }

    #[test]
    fn test_keep_outcome_always_empty() {
        let config = EngineConfig::default();
        let payload = build_suggestion(
            &week(),
            &activity(Sport::Rowing, 75.0, 6, Weekday::Tue),
            &context(),
            &config,
        );
        assert!(payload.keep.edits.is_empty());
        assert_eq!(payload.outcome("keep").unwrap(), &payload.keep);
        assert!(payload.outcome("nonsense").is_none());
    }

    #[test]
    fn test_suggest_is_pure_and_leaves_inputs_alone() {
        let config = EngineConfig::default();
        let runs = week();
        let act = activity(Sport::Soccer, 120.0, 7, Weekday::Sat);
        let ctx = context();

        let runs_before = runs.clone();
        let act_before = act.clone();

        let first = build_suggestion(&runs, &act, &ctx, &config);
        for _ in 0..4 {
            let again = build_suggestion(&runs, &act, &ctx, &config);
            assert_eq!(again, first);
        }
        assert_eq!(runs, runs_before);
        assert_eq!(act, act_before);
    }

    #[test]
    fn test_zero_duration_activity_produces_empty_outcomes() {
        let config = EngineConfig::default();
        let payload = build_suggestion(
            &week(),
            &activity(Sport::Cycling, 0.0, 5, Weekday::Mon),
            &context(),
            &config,
        );
        assert!(payload.load.is_zero());
        assert!(payload.conservative.edits.is_empty());
        assert!(payload.recommended.edits.is_empty());
        assert_eq!(payload.severity, Severity::Light);
    }

    #[test]
    fn test_severity_classification_ratios() {
        let config = EngineConfig::default();
        let act = activity(Sport::Soccer, 60.0, 6, Weekday::Sat);
        let mk_load = |fcl: f64| UniversalLoadResult {
            aerobic_load: fcl * 0.8,
            anaerobic_load: fcl * 0.2,
            base_load: fcl,
            fatigue_cost_load: fcl,
            run_replacement_credit: 20.0,
            tier: LoadTier::HeartRate,
            confidence: 0.85,
            equivalent_easy_km: 3.0,
            explanations: Vec::new(),
        };
        assert_eq!(
            classify_severity(&config.severity, &mk_load(30.0), &act, 300.0),
            Severity::Light
        );
        assert_eq!(
            classify_severity(&config.severity, &mk_load(90.0), &act, 300.0),
            Severity::Heavy
        );
        assert_eq!(
            classify_severity(&config.severity, &mk_load(200.0), &act, 300.0),
            Severity::Extreme
        );
    }
}
