//! Budgeted adjustment builder
//!
//! The algorithmic core: a greedy, budget-constrained allocation over the
//! similarity-ranked candidate list. Invoked once per outcome with its own
//! budget and rule set. The conservative outcome spends the unsaturated
//! fatigue cost load and may only downgrade or reduce; the recommended
//! outcome spends the saturated run-replacement credit and may also replace
//! workouts outright when confidence allows.
//!
//! Hard constraints, enforced by construction:
//! - edits never spend more than the outcome's budget (plus rounding);
//! - at most `max_edits(severity)` edits per outcome;
//! - at least `preserve_min` planned runs stay untouched by replacement;
//! - long runs are only ever reduced outside injury mode, with both an
//!   absolute and a fractional floor.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::AdjustmentConfig;
use crate::library::WorkoutLibrary;
use crate::models::{EditAction, PlanEdit, PlannedRun, Severity, WorkoutCategory};
use crate::scoring::Candidate;
use crate::universal_load::UniversalLoadResult;

/// Which of the alternative outcomes is being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Spend fatigue cost; downgrade and reduce only
    Conservative,
    /// Spend replacement credit; replacement allowed when confidence is high
    Recommended,
}

impl OutcomeKind {
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::Conservative => "conservative",
            OutcomeKind::Recommended => "recommended",
        }
    }
}

/// One alternative set of plan edits, with its budget accounting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOutcome {
    /// Outcome label ("keep", "conservative", "recommended")
    pub label: String,

    /// Proposed edits, in allocation order
    pub edits: Vec<PlanEdit>,

    /// Budget this outcome was allowed to spend
    pub budget: f64,

    /// Load actually spent across all edits
    pub total_load_reduction: f64,

    /// Leftover, uncredited budget. Reported back rather than forced
    /// onto the plan.
    pub overflow: f64,

    /// One-line human summary
    pub summary: String,

    /// Whether a replacement was withheld to preserve the minimum
    /// number of planned runs
    pub replace_blocked_by_preserve: bool,
}

impl ChoiceOutcome {
    /// The do-nothing outcome, always offered
    pub fn keep() -> Self {
        ChoiceOutcome {
            label: "keep".to_string(),
            edits: Vec::new(),
            budget: 0.0,
            total_load_reduction: 0.0,
            overflow: 0.0,
            summary: "Keep the plan unchanged".to_string(),
            replace_blocked_by_preserve: false,
        }
    }

    pub fn full_replacement_count(&self) -> usize {
        self.edits
            .iter()
            .filter(|e| e.action == EditAction::Replace)
            .count()
    }
}

/// Minimum number of planned runs that must remain untouched by
/// replacement, regardless of how much credit the session earned
pub fn preserve_min(config: &AdjustmentConfig, planned_count: usize) -> usize {
    let fractional = (planned_count as f64 * config.preserve_fraction).ceil() as usize;
    fractional.max(config.preserve_min_runs)
}

/// Greedy budget-constrained edit builder
pub struct AdjustmentBuilder<'a> {
    config: &'a AdjustmentConfig,
    library: &'a dyn WorkoutLibrary,
}

/// Outcome of weighing one candidate against the current budget
struct EditDecision {
    edit: Option<PlanEdit>,
    /// Replacement was justified but the preserve floor blocked it;
    /// the candidate falls back to a reduce or downgrade instead
    blocked_by_preserve: bool,
}

impl EditDecision {
    fn skip() -> Self {
        EditDecision {
            edit: None,
            blocked_by_preserve: false,
        }
    }

    fn edit(edit: PlanEdit) -> Self {
        EditDecision {
            edit: Some(edit),
            blocked_by_preserve: false,
        }
    }
}

impl<'a> AdjustmentBuilder<'a> {
    pub fn new(config: &'a AdjustmentConfig, library: &'a dyn WorkoutLibrary) -> Self {
        AdjustmentBuilder { config, library }
    }

    /// Build one outcome by walking the ranked candidates and spending
    /// the outcome's budget until a stop condition hits.
    pub fn build(
        &self,
        kind: OutcomeKind,
        candidates: &[Candidate],
        load: &UniversalLoadResult,
        severity: Severity,
        planned_count: usize,
        sport_label: &str,
    ) -> ChoiceOutcome {
        let budget = match kind {
            OutcomeKind::Conservative => load.fatigue_cost_load,
            OutcomeKind::Recommended => load.run_replacement_credit,
        };
        let allow_replace = kind == OutcomeKind::Recommended
            && load.confidence >= self.config.replace_min_confidence;
        let is_extreme = severity == Severity::Extreme;

        let preserve = preserve_min(self.config, planned_count);
        let mut replacements_left = planned_count.saturating_sub(preserve);

        let mut remaining = budget;
        let mut edits: Vec<PlanEdit> = Vec::new();
        let mut blocked_by_preserve = false;

        for candidate in candidates {
            if edits.len() >= severity.max_edits() {
                break;
            }
            if remaining <= self.config.min_worthwhile_load {
                break;
            }

            let decision = self.decide_edit(
                candidate,
                remaining,
                allow_replace,
                is_extreme,
                replacements_left,
                sport_label,
            );

            if decision.blocked_by_preserve {
                blocked_by_preserve = true;
            }
            if let Some(edit) = decision.edit {
                trace!(
                    run = %edit.run_id,
                    action = ?edit.action,
                    reduction = edit.load_reduction,
                    "allocated edit"
                );
                if edit.action == EditAction::Replace {
                    replacements_left = replacements_left.saturating_sub(1);
                }
                remaining -= edit.load_reduction;
                edits.push(edit);
            }
        }

        let total: f64 = edits.iter().map(|e| e.load_reduction).sum();
        debug!(
            outcome = kind.label(),
            budget,
            spent = total,
            edits = edits.len(),
            "built outcome"
        );

        let summary = summarize(kind, &edits, sport_label);

        ChoiceOutcome {
            label: kind.label().to_string(),
            edits,
            budget,
            total_load_reduction: total,
            overflow: (budget - total).max(0.0),
            summary,
            replace_blocked_by_preserve: blocked_by_preserve,
        }
    }

    /// Pick the edit for one candidate under the current budget, or skip
    fn decide_edit(
        &self,
        candidate: &Candidate,
        remaining: f64,
        allow_replace: bool,
        is_extreme: bool,
        replacements_left: usize,
        sport_label: &str,
    ) -> EditDecision {
        let run = &candidate.run;
        let run_load = candidate.run_load;
        if run_load <= 0.0 {
            return EditDecision::skip();
        }

        if run.is_long_run() {
            return self.decide_long_run(candidate, remaining, allow_replace, replacements_left, sport_label);
        }

        if run.is_quality() {
            return self.decide_quality(candidate, remaining, allow_replace, is_extreme, replacements_left, sport_label);
        }

        self.decide_easy(candidate, remaining, allow_replace, replacements_left, sport_label)
    }

    /// Distance of a run, in km. Plans sometimes carry a zero distance with
    /// the real session only in the description ("6x800m"); parse it, and
    /// as a last resort estimate from the planned load.
    fn resolve_distance_km(&self, run: &PlannedRun) -> f64 {
        let km = run.distance_km();
        if km > 0.0 {
            return km;
        }
        if let Some(meters) = self.library.parse_workout_distance(&run.description) {
            return meters.to_f64().unwrap_or(0.0) / 1000.0;
        }
        run.total_load() / self.config.estimated_easy_load_per_km
    }

    /// Quality sessions: prefer a one-rung downgrade, charging the real
    /// load delta. Only an extreme session may replace one outright, and
    /// the replacement is a shakeout, not a skip.
    fn decide_quality(
        &self,
        candidate: &Candidate,
        remaining: f64,
        allow_replace: bool,
        is_extreme: bool,
        replacements_left: usize,
        sport_label: &str,
    ) -> EditDecision {
        let run = &candidate.run;
        let run_load = candidate.run_load;
        let mut blocked = false;

        if is_extreme
            && allow_replace
            && candidate.can_replace
            && remaining >= self.config.quality_replace_threshold * run_load
        {
            if replacements_left == 0 {
                blocked = true;
            } else {
                let shakeout_m = Decimal::from_f64(self.config.shakeout_km * 1000.0)
                    .unwrap_or(Decimal::ZERO);
                let shakeout_load = self
                    .library
                    .compute_workout_load(WorkoutCategory::Easy, "shakeout", shakeout_m)
                    .total();
                let reduction = run_load - shakeout_load;
                if reduction > 0.0 && reduction <= remaining {
                    return EditDecision::edit(PlanEdit {
                        run_id: run.id.clone(),
                        day: run.day,
                        action: EditAction::Replace,
                        original_category: run.category,
                        new_category: WorkoutCategory::Easy,
                        original_distance_m: run.distance_m,
                        new_distance_m: shakeout_m,
                        load_reduction: reduction,
                        rationale: format!(
                            "The {} session covered this workout's stimulus; swap the {} for a {:.0} km shakeout",
                            sport_label,
                            run.category.display_name(),
                            self.config.shakeout_km
                        ),
                    });
                }
            }
        }

        let downgraded = match run.category.downgraded() {
            Some(category) => category,
            None => {
                return EditDecision {
                    edit: None,
                    blocked_by_preserve: blocked,
                }
            }
        };
        let original_load = self
            .library
            .compute_workout_load(run.category, &run.description, run.distance_m)
            .total();
        let downgraded_load = self
            .library
            .compute_workout_load(downgraded, &run.description, run.distance_m)
            .total();
        let delta = original_load - downgraded_load;
        if delta <= 0.0 || delta > remaining {
            return EditDecision {
                edit: None,
                blocked_by_preserve: blocked,
            };
        }

        EditDecision {
            blocked_by_preserve: blocked,
            edit: Some(PlanEdit {
                run_id: run.id.clone(),
                day: run.day,
                action: EditAction::Downgrade,
                original_category: run.category,
                new_category: downgraded,
                original_distance_m: run.distance_m,
                new_distance_m: run.distance_m,
                load_reduction: delta,
                rationale: format!(
                    "Ease {} down to {} to absorb the {} session",
                    run.category.display_name(),
                    downgraded.display_name(),
                    sport_label
                ),
            }),
        }
    }

    /// Easy runs: replace fully when the budget and confidence justify it,
    /// otherwise reduce proportionally with a cap and a floor.
    fn decide_easy(
        &self,
        candidate: &Candidate,
        remaining: f64,
        allow_replace: bool,
        replacements_left: usize,
        sport_label: &str,
    ) -> EditDecision {
        let run = &candidate.run;
        let run_load = candidate.run_load;
        let mut blocked = false;

        if allow_replace
            && candidate.can_replace
            && remaining >= self.config.replace_threshold * run_load
        {
            if replacements_left == 0 {
                blocked = true;
            } else {
                // Never charge more than is left in the budget
                let reduction = run_load.min(remaining);
                return EditDecision::edit(PlanEdit {
                    run_id: run.id.clone(),
                    day: run.day,
                    action: EditAction::Replace,
                    original_category: run.category,
                    new_category: run.category,
                    original_distance_m: run.distance_m,
                    new_distance_m: Decimal::ZERO,
                    load_reduction: reduction,
                    rationale: format!(
                        "The {} session fully replaces this {}",
                        sport_label,
                        run.category.display_name()
                    ),
                });
            }
        }

        let distance_km = self.resolve_distance_km(run);
        if distance_km <= 0.0 {
            return EditDecision {
                edit: None,
                blocked_by_preserve: blocked,
            };
        }
        let cut = (remaining / run_load).min(self.config.easy_max_cut);
        let proposed_km = (distance_km * (1.0 - cut)).max(self.config.easy_floor_km);
        if proposed_km >= distance_km {
            return EditDecision {
                edit: None,
                blocked_by_preserve: blocked,
            };
        }
        let actual_cut = 1.0 - proposed_km / distance_km;
        let reduction = run_load * actual_cut;

        EditDecision {
            blocked_by_preserve: blocked,
            edit: Some(PlanEdit {
                run_id: run.id.clone(),
                day: run.day,
                action: EditAction::Reduce,
                original_category: run.category,
                new_category: run.category,
                original_distance_m: run.distance_m,
                new_distance_m: km_to_meters(proposed_km),
                load_reduction: reduction,
                rationale: format!(
                    "Shorten this {} by {:.0}% after the {} session",
                    run.category.display_name(),
                    actual_cut * 100.0,
                    sport_label
                ),
            }),
        }
    }

    /// Long runs carry the strongest protection: reductions only outside
    /// injury mode, with a small cap and both floors.
    fn decide_long_run(
        &self,
        candidate: &Candidate,
        remaining: f64,
        allow_replace: bool,
        replacements_left: usize,
        sport_label: &str,
    ) -> EditDecision {
        let run = &candidate.run;
        let run_load = candidate.run_load;
        let distance_km = self.resolve_distance_km(run);
        if distance_km <= 0.0 {
            return EditDecision::skip();
        }
        let mut blocked = false;

        // can_replace is only true for a long run in injury mode
        if allow_replace
            && candidate.can_replace
            && remaining >= self.config.replace_threshold * run_load
        {
            if replacements_left == 0 {
                blocked = true;
            } else {
                let reduction = run_load.min(remaining);
                return EditDecision::edit(PlanEdit {
                    run_id: run.id.clone(),
                    day: run.day,
                    action: EditAction::Replace,
                    original_category: run.category,
                    new_category: run.category,
                    original_distance_m: run.distance_m,
                    new_distance_m: Decimal::ZERO,
                    load_reduction: reduction,
                    rationale: format!(
                        "Injury management: the {} session stands in for the long run",
                        sport_label
                    ),
                });
            }
        }

        let cut = (remaining / run_load).min(self.config.long_max_cut);
        let floor_km = self
            .config
            .long_floor_km
            .max(self.config.long_floor_fraction * distance_km);
        let proposed_km = (distance_km * (1.0 - cut)).max(floor_km);
        if proposed_km >= distance_km {
            return EditDecision {
                edit: None,
                blocked_by_preserve: blocked,
            };
        }
        let actual_cut = 1.0 - proposed_km / distance_km;
        let reduction = run_load * actual_cut;

        EditDecision {
            blocked_by_preserve: blocked,
            edit: Some(PlanEdit {
                run_id: run.id.clone(),
                day: run.day,
                action: EditAction::Reduce,
                original_category: run.category,
                new_category: run.category,
                original_distance_m: run.distance_m,
                new_distance_m: km_to_meters(proposed_km),
                load_reduction: reduction,
                rationale: format!(
                    "Trim the long run by {:.0}% after the {} session; the rest stays protected",
                    actual_cut * 100.0,
                    sport_label
                ),
            }),
        }
    }
}

fn km_to_meters(km: f64) -> Decimal {
    Decimal::from_f64((km * 1000.0).round()).unwrap_or(Decimal::ZERO)
}

fn summarize(kind: OutcomeKind, edits: &[PlanEdit], sport_label: &str) -> String {
    if edits.is_empty() {
        return format!(
            "No changes needed; the {} session fits within the week",
            sport_label
        );
    }
    let downgrades = edits.iter().filter(|e| e.action == EditAction::Downgrade).count();
    let reductions = edits.iter().filter(|e| e.action == EditAction::Reduce).count();
    let replacements = edits.iter().filter(|e| e.action == EditAction::Replace).count();
    let mut parts = Vec::new();
    if replacements > 0 {
        parts.push(format!("{} replaced", replacements));
    }
    if downgrades > 0 {
        parts.push(format!("{} downgraded", downgrades));
    }
    if reductions > 0 {
        parts.push(format!("{} shortened", reductions));
    }
    format!(
        "{}: {} workout(s) adjusted ({})",
        kind.label(),
        edits.len(),
        parts.join(", ")
    )
}
