//! Property-based tests over randomized weeks and activities. These pin
//! the hard guarantees of the pipeline: budgets are never overspent, the
//! replacement credit saturates, and plan protection rules always hold.

use chrono::Weekday;
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crossload::config::EngineConfig;
use crossload::library::{StandardLibrary, WorkoutLibrary};
use crossload::models::{
    ActivityInput, AthleteContext, EditAction, GoalRace, PlannedRun, RunStatus, Sport,
    WorkoutCategory,
};
use crossload::suggestion::build_suggestion;
use crossload::universal_load::compute_universal_load;

const DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const SPORTS: [Sport; 8] = [
    Sport::Cycling,
    Sport::Swimming,
    Sport::Rowing,
    Sport::Soccer,
    Sport::Rugby,
    Sport::Basketball,
    Sport::Padel,
    Sport::Boxing,
];

const CATEGORIES: [WorkoutCategory; 6] = [
    WorkoutCategory::Recovery,
    WorkoutCategory::Easy,
    WorkoutCategory::Threshold,
    WorkoutCategory::Intervals,
    WorkoutCategory::Vo2Max,
    WorkoutCategory::MarathonPace,
];

fn goal_strategy() -> impl Strategy<Value = GoalRace> {
    prop_oneof![
        Just(GoalRace::Marathon),
        Just(GoalRace::HalfMarathon),
        Just(GoalRace::TenK),
        Just(GoalRace::FiveK),
    ]
}

fn activity_strategy() -> impl Strategy<Value = ActivityInput> {
    (0usize..SPORTS.len(), 10.0f64..300.0, 1u8..=10, 0usize..7).prop_map(
        |(sport_idx, duration_min, rpe, day_idx)| ActivityInput {
            sport: SPORTS[sport_idx].clone(),
            duration_min,
            rpe: Some(rpe),
            sensor: None,
            zones: None,
            day: DAYS[day_idx],
            notes: None,
        },
    )
}

fn run_strategy(index: usize) -> impl Strategy<Value = PlannedRun> {
    (0usize..CATEGORIES.len(), 3i64..=18).prop_map(move |(cat_idx, km)| {
        let category = CATEGORIES[cat_idx];
        let meters = Decimal::from(km * 1000);
        let lib = StandardLibrary::new();
        let load = lib.compute_workout_load(category, "", meters);
        PlannedRun {
            id: format!("run_{}", index),
            day: DAYS[index % DAYS.len()],
            category,
            description: String::new(),
            distance_m: meters,
            aerobic_load: load.aerobic,
            anaerobic_load: load.anaerobic,
            status: RunStatus::Planned,
        }
    })
}

fn week_strategy() -> impl Strategy<Value = Vec<PlannedRun>> {
    (2usize..=6).prop_flat_map(|n| {
        let runs: Vec<_> = (0..n).map(run_strategy).collect();
        (runs, any::<bool>()).prop_map(|(mut runs, with_long)| {
            if with_long {
                let lib = StandardLibrary::new();
                let meters = Decimal::from(24_000);
                let load = lib.compute_workout_load(WorkoutCategory::Long, "", meters);
                runs.push(PlannedRun {
                    id: "long".to_string(),
                    day: Weekday::Sun,
                    category: WorkoutCategory::Long,
                    description: String::new(),
                    distance_m: meters,
                    aerobic_load: load.aerobic,
                    anaerobic_load: load.anaerobic,
                    status: RunStatus::Planned,
                });
            }
            runs
        })
    })
}

proptest! {
    /// Neither outcome ever spends more than its budget, and the budget
    /// accounting always adds up.
    #[test]
    fn budgets_are_never_overspent(
        week in week_strategy(),
        activity in activity_strategy(),
        goal in goal_strategy(),
    ) {
        let config = EngineConfig::default();
        let context = AthleteContext { goal, injury_mode: false };
        let payload = build_suggestion(&week, &activity, &context, &config);

        for outcome in [&payload.conservative, &payload.recommended] {
            let spent: f64 = outcome.edits.iter().map(|e| e.load_reduction).sum();
            prop_assert!((spent - outcome.total_load_reduction).abs() < 1e-9);
            prop_assert!(
                outcome.total_load_reduction
                    <= outcome.budget + config.adjustment.budget_epsilon
            );
            prop_assert!(outcome.overflow >= 0.0);
            prop_assert!(
                (outcome.overflow - (outcome.budget - outcome.total_load_reduction).max(0.0))
                    .abs() < 1e-9
            );
        }
    }

    /// Edit counts respect the severity cap and every edit targets a
    /// distinct planned run.
    #[test]
    fn edits_are_bounded_and_distinct(
        week in week_strategy(),
        activity in activity_strategy(),
        goal in goal_strategy(),
    ) {
        let config = EngineConfig::default();
        let context = AthleteContext { goal, injury_mode: false };
        let payload = build_suggestion(&week, &activity, &context, &config);

        for outcome in [&payload.conservative, &payload.recommended] {
            prop_assert!(outcome.edits.len() <= payload.severity.max_edits());
            let targets: std::collections::HashSet<_> = outcome
                .edits
                .iter()
                .map(|e| (e.run_id.clone(), e.day))
                .collect();
            prop_assert_eq!(targets.len(), outcome.edits.len());
            for edit in &outcome.edits {
                prop_assert!(week
                    .iter()
                    .any(|r| r.id == edit.run_id && r.day == edit.day));
            }
        }
    }

    /// The conservative outcome never proposes a replacement, and the
    /// recommended one never replaces so many runs that fewer than the
    /// preserve floor remain.
    #[test]
    fn run_preservation_holds(
        week in week_strategy(),
        activity in activity_strategy(),
        goal in goal_strategy(),
    ) {
        let config = EngineConfig::default();
        let context = AthleteContext { goal, injury_mode: false };
        let payload = build_suggestion(&week, &activity, &context, &config);

        prop_assert!(payload
            .conservative
            .edits
            .iter()
            .all(|e| e.action != EditAction::Replace));

        let preserve = crossload::adjustment::preserve_min(&config.adjustment, week.len());
        let replaced = payload.recommended.full_replacement_count();
        prop_assert!(week.len().saturating_sub(replaced) >= preserve.min(week.len()));
    }

    /// A full skip only happens when the budget covered nearly the whole
    /// run, and it is never charged more than the run was worth.
    #[test]
    fn full_skips_are_fully_funded(
        week in week_strategy(),
        activity in activity_strategy(),
        goal in goal_strategy(),
    ) {
        let config = EngineConfig::default();
        let context = AthleteContext { goal, injury_mode: false };
        let payload = build_suggestion(&week, &activity, &context, &config);

        for edit in payload
            .recommended
            .edits
            .iter()
            .filter(|e| e.is_full_skip())
        {
            let run = week
                .iter()
                .find(|r| r.id == edit.run_id && r.day == edit.day)
                .unwrap();
            prop_assert!(
                edit.load_reduction
                    >= config.adjustment.replace_threshold * run.total_load() - 1e-6
            );
            prop_assert!(edit.load_reduction <= run.total_load() + 1e-6);
        }
    }

    /// Long runs are never replaced outside injury mode, and reductions
    /// honor both floors.
    #[test]
    fn long_runs_are_protected(
        week in week_strategy(),
        activity in activity_strategy(),
        goal in goal_strategy(),
    ) {
        let config = EngineConfig::default();
        let context = AthleteContext { goal, injury_mode: false };
        let payload = build_suggestion(&week, &activity, &context, &config);

        for outcome in [&payload.conservative, &payload.recommended] {
            for edit in &outcome.edits {
                let run = week
                    .iter()
                    .find(|r| r.id == edit.run_id && r.day == edit.day)
                    .unwrap();
                if !run.is_long_run() {
                    continue;
                }
                prop_assert_eq!(edit.action, EditAction::Reduce);
                let orig_km = run.distance_km();
                let new_km = edit.new_distance_m.to_f64().unwrap_or(0.0) / 1000.0;
                prop_assert!(new_km >= config.adjustment.long_floor_km - 1e-3);
                prop_assert!(
                    new_km >= orig_km * config.adjustment.long_floor_fraction - 1e-3
                );
                prop_assert!(
                    new_km >= orig_km * (1.0 - config.adjustment.long_max_cut) - 1e-3
                );
            }
        }
    }

    /// Downgrades change intensity, never distance.
    #[test]
    fn downgrades_keep_distance(
        week in week_strategy(),
        activity in activity_strategy(),
        goal in goal_strategy(),
    ) {
        let config = EngineConfig::default();
        let context = AthleteContext { goal, injury_mode: false };
        let payload = build_suggestion(&week, &activity, &context, &config);

        for outcome in [&payload.conservative, &payload.recommended] {
            for edit in &outcome.edits {
                if edit.action == EditAction::Downgrade {
                    prop_assert_eq!(edit.new_distance_m, edit.original_distance_m);
                    prop_assert_ne!(edit.new_category, edit.original_category);
                }
            }
        }
    }

    /// The replacement credit is monotone in duration and bounded by the
    /// saturation asymptote; the fatigue cost is not capped.
    #[test]
    fn credit_saturates_but_fatigue_does_not(
        sport_idx in 0usize..SPORTS.len(),
        rpe in 1u8..=10,
        goal in goal_strategy(),
    ) {
        let config = EngineConfig::default();
        let mk = |duration_min: f64| ActivityInput {
            sport: SPORTS[sport_idx].clone(),
            duration_min,
            rpe: Some(rpe),
            sensor: None,
            zones: None,
            day: Weekday::Sat,
            notes: None,
        };

        let mut previous_credit = 0.0;
        let mut previous_cost = 0.0;
        for duration in [30.0, 60.0, 120.0, 240.0, 480.0] {
            let load = compute_universal_load(&mk(duration), goal, &config.load, &config.credit);
            prop_assert!(load.run_replacement_credit >= previous_credit - 1e-9);
            prop_assert!(load.run_replacement_credit < config.credit.credit_max);
            prop_assert!(load.fatigue_cost_load >= previous_cost);
            prop_assert!(
                load.equivalent_easy_km <= config.credit.equivalent_km_cap + 1e-9
            );
            previous_credit = load.run_replacement_credit;
            previous_cost = load.fatigue_cost_load;
        }
    }

    /// Zero-data activities yield a zero result and an untouched plan,
    /// never an error.
    #[test]
    fn zero_duration_is_harmless(
        week in week_strategy(),
        goal in goal_strategy(),
        sport_idx in 0usize..SPORTS.len(),
    ) {
        let config = EngineConfig::default();
        let activity = ActivityInput {
            sport: SPORTS[sport_idx].clone(),
            duration_min: 0.0,
            rpe: None,
            sensor: None,
            zones: None,
            day: Weekday::Mon,
            notes: None,
        };
        let context = AthleteContext { goal, injury_mode: false };
        let payload = build_suggestion(&week, &activity, &context, &config);
        prop_assert!(payload.load.is_zero());
        prop_assert!(payload.conservative.edits.is_empty());
        prop_assert!(payload.recommended.edits.is_empty());
    }
}
