//! Edit application
//!
//! Turns an accepted outcome's edits into a new weekly plan. The input plan
//! is never mutated; callers get a fresh vector back and decide what to do
//! with it. This is the only place in the engine that can fail: a plan with
//! duplicate (id, day) pairs, or an edit pointing at a workout the plan
//! does not contain, means the interface layer handed us garbage.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{AdjustmentError, Result};
use crate::library::WorkoutLibrary;
use crate::models::{EditAction, PlanEdit, PlannedRun, RunStatus};

/// Apply a set of accepted edits to a weekly plan, returning the adjusted
/// plan. Workouts are matched by (id, day). Loads are recomputed from the
/// post-edit category and distance so downstream weekly totals stay honest;
/// descriptions are rewritten so the plan reads correctly on its own.
pub fn apply_edits(
    plan: &[PlannedRun],
    edits: &[PlanEdit],
    sport_label: &str,
    library: &dyn WorkoutLibrary,
) -> Result<Vec<PlannedRun>> {
    let mut seen: HashSet<(&str, chrono::Weekday)> = HashSet::new();
    for run in plan {
        if !seen.insert((run.id.as_str(), run.day)) {
            return Err(AdjustmentError::AmbiguousPlan {
                id: run.id.clone(),
                day: run.day.to_string(),
            }
            .into());
        }
    }

    let mut adjusted: Vec<PlannedRun> = plan.to_vec();
    for edit in edits {
        let run = adjusted
            .iter_mut()
            .find(|run| run.id == edit.run_id && run.day == edit.day)
            .ok_or_else(|| AdjustmentError::UnknownTarget {
                id: edit.run_id.clone(),
                day: edit.day.to_string(),
            })?;

        apply_one(run, edit, sport_label, library);
        debug!(
            run_id = %run.id,
            action = ?edit.action,
            new_status = ?run.status,
            "applied edit"
        );
    }

    Ok(adjusted)
}

fn apply_one(run: &mut PlannedRun, edit: &PlanEdit, sport_label: &str, library: &dyn WorkoutLibrary) {
    run.category = edit.new_category;
    run.distance_m = edit.new_distance_m;
    let new_km = run.distance_km();
    run.status = match edit.action {
        EditAction::Downgrade | EditAction::Reduce => RunStatus::Reduced,
        EditAction::Replace if edit.new_distance_m == Decimal::ZERO => RunStatus::Skipped,
        // A replacement with distance left is a substitute session, still run
        EditAction::Replace => RunStatus::Replaced,
    };

    run.description = match run.status {
        RunStatus::Skipped => format!("Covered by the {} session", sport_label),
        RunStatus::Replaced => format!(
            "{:.1} km shakeout after the {} session",
            new_km, sport_label
        ),
        _ => match edit.action {
            EditAction::Downgrade => format!(
                "{:.1} km {} (eased from {} after the {} session)",
                new_km,
                run.category.display_name(),
                edit.original_category.display_name(),
                sport_label
            ),
            _ => format!(
                "{:.1} km {} (shortened after the {} session)",
                new_km,
                run.category.display_name(),
                sport_label
            ),
        },
    };

    let load = library.compute_workout_load(run.category, &run.description, run.distance_m);
    run.aerobic_load = load.aerobic;
    run.anaerobic_load = load.anaerobic;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::StandardLibrary;
    use crate::models::WorkoutCategory;
    use chrono::Weekday;
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

    fn edit(
        run_id: &str,
        day: Weekday,
        action: EditAction,
        original: WorkoutCategory,
        new: WorkoutCategory,
        original_m: Decimal,
        new_m: Decimal,
    ) -> PlanEdit {
        PlanEdit {
            run_id: run_id.to_string(),
            day,
            action,
            original_category: original,
            new_category: new,
            original_distance_m: original_m,
            new_distance_m: new_m,
            load_reduction: 0.0,
            rationale: String::new(),
        }
    }

    #[test]
    fn test_reduce_shortens_and_marks_reduced() {
        let lib = StandardLibrary::new();
        let plan = vec![run("mon_easy", Weekday::Mon, WorkoutCategory::Easy, dec!(8000))];
        let edits = vec![edit(
            "mon_easy",
            Weekday::Mon,
            EditAction::Reduce,
            WorkoutCategory::Easy,
            WorkoutCategory::Easy,
            dec!(8000),
            dec!(5000),
        )];

        let adjusted = apply_edits(&plan, &edits, "soccer", &lib).unwrap();
        assert_eq!(adjusted[0].status, RunStatus::Reduced);
        assert_eq!(adjusted[0].distance_m, dec!(5000));
        assert!(adjusted[0].total_load() < plan[0].total_load());
        // Original plan untouched
        assert_eq!(plan[0].status, RunStatus::Planned);
        assert_eq!(plan[0].distance_m, dec!(8000));
    }

    #[test]
    fn test_downgrade_keeps_distance_changes_category() {
        let lib = StandardLibrary::new();
        let plan = vec![run("tue_vo2", Weekday::Tue, WorkoutCategory::Vo2Max, dec!(10000))];
        let edits = vec![edit(
            "tue_vo2",
            Weekday::Tue,
            EditAction::Downgrade,
            WorkoutCategory::Vo2Max,
            WorkoutCategory::Threshold,
            dec!(10000),
            dec!(10000),
        )];

        let adjusted = apply_edits(&plan, &edits, "soccer", &lib).unwrap();
        assert_eq!(adjusted[0].category, WorkoutCategory::Threshold);
        assert_eq!(adjusted[0].distance_m, dec!(10000));
        assert_eq!(adjusted[0].status, RunStatus::Reduced);
        assert!(adjusted[0].anaerobic_load < plan[0].anaerobic_load);
    }

    #[test]
    fn test_full_replace_marks_skipped_with_zero_load() {
        let lib = StandardLibrary::new();
        let plan = vec![run("fri_easy", Weekday::Fri, WorkoutCategory::Easy, dec!(6000))];
        let edits = vec![edit(
            "fri_easy",
            Weekday::Fri,
            EditAction::Replace,
            WorkoutCategory::Easy,
            WorkoutCategory::Easy,
            dec!(6000),
            Decimal::ZERO,
        )];

        let adjusted = apply_edits(&plan, &edits, "soccer", &lib).unwrap();
        assert_eq!(adjusted[0].status, RunStatus::Skipped);
        assert_eq!(adjusted[0].total_load(), 0.0);
    }

    #[test]
    fn test_shakeout_replacement_stays_active() {
        let lib = StandardLibrary::new();
        let plan = vec![run("wed_intervals", Weekday::Wed, WorkoutCategory::Intervals, dec!(9000))];
        let edits = vec![edit(
            "wed_intervals",
            Weekday::Wed,
            EditAction::Replace,
            WorkoutCategory::Intervals,
            WorkoutCategory::Easy,
            dec!(9000),
            dec!(3000),
        )];

        let adjusted = apply_edits(&plan, &edits, "soccer", &lib).unwrap();
        assert_eq!(adjusted[0].status, RunStatus::Replaced);
        assert_eq!(adjusted[0].category, WorkoutCategory::Easy);
        assert_eq!(adjusted[0].distance_m, dec!(3000));
        assert!(adjusted[0].total_load() > 0.0);
    }

    #[test]
    fn test_duplicate_plan_entries_rejected() {
        let lib = StandardLibrary::new();
        let plan = vec![
            run("easy", Weekday::Mon, WorkoutCategory::Easy, dec!(8000)),
            run("easy", Weekday::Mon, WorkoutCategory::Easy, dec!(5000)),
        ];
        let err = apply_edits(&plan, &[], "soccer", &lib).unwrap_err();
        assert!(err.user_message().contains("easy"));
    }

    #[test]
    fn test_same_id_different_days_allowed() {
        let lib = StandardLibrary::new();
        let plan = vec![
            run("easy", Weekday::Mon, WorkoutCategory::Easy, dec!(8000)),
            run("easy", Weekday::Thu, WorkoutCategory::Easy, dec!(5000)),
        ];
        let edits = vec![edit(
            "easy",
            Weekday::Thu,
            EditAction::Reduce,
            WorkoutCategory::Easy,
            WorkoutCategory::Easy,
            dec!(5000),
            dec!(4000),
        )];

        let adjusted = apply_edits(&plan, &edits, "soccer", &lib).unwrap();
        assert_eq!(adjusted[0].distance_m, dec!(8000));
        assert_eq!(adjusted[1].distance_m, dec!(4000));
        assert_eq!(adjusted[1].status, RunStatus::Reduced);
    }

    #[test]
    fn test_unknown_target_rejected() {
        let lib = StandardLibrary::new();
        let plan = vec![run("mon_easy", Weekday::Mon, WorkoutCategory::Easy, dec!(8000))];
        let edits = vec![edit(
            "ghost",
            Weekday::Mon,
            EditAction::Reduce,
            WorkoutCategory::Easy,
            WorkoutCategory::Easy,
            dec!(8000),
            dec!(5000),
        )];
        let err = apply_edits(&plan, &edits, "soccer", &lib).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_untouched_runs_pass_through_unchanged() {
        let lib = StandardLibrary::new();
        let plan = vec![
            run("mon_easy", Weekday::Mon, WorkoutCategory::Easy, dec!(8000)),
            run("sun_long", Weekday::Sun, WorkoutCategory::Long, dec!(26000)),
        ];
        let edits = vec![edit(
            "mon_easy",
            Weekday::Mon,
            EditAction::Reduce,
            WorkoutCategory::Easy,
            WorkoutCategory::Easy,
            dec!(8000),
            dec!(4400),
        )];

        let adjusted = apply_edits(&plan, &edits, "soccer", &lib).unwrap();
        assert_eq!(adjusted[1], plan[1]);
    }
}
