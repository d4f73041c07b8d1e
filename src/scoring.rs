//! Candidate scoring
//!
//! Ranks the week's planned runs by how suitable they are as adjustment
//! targets for a given activity. The core signal is vibe similarity: how
//! interchangeable the activity and the run are, judged by load magnitude
//! and aerobic/anaerobic balance. Goal-specific protection pushes the most
//! race-specific sessions toward the bottom of the list.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::models::{AthleteContext, GoalRace, PlannedRun, RunStatus, Sport, WorkoutCategory};
use crate::sport_profile::SportProfileTable;
use crate::universal_load::UniversalLoadResult;

/// One scored adjustment target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The planned run under consideration
    pub run: PlannedRun,

    /// Vibe similarity, 0-1 band before modifiers
    pub similarity: f64,

    /// The run's total planned load
    pub run_load: f64,

    /// Whether a full replacement of this run is ever permissible
    pub can_replace: bool,
}

/// How race-specific, and therefore protected, a workout category is for a
/// given goal. 0 = freely touchable, 3 = most protected.
pub fn protection_priority(goal: GoalRace, category: WorkoutCategory) -> u8 {
    use WorkoutCategory::*;
    match goal {
        GoalRace::Marathon => match category {
            Long | MarathonPace => 3,
            Threshold | Progressive | RacePace => 2,
            Mixed | Vo2Max | Intervals | HillRepeats => 1,
            Easy | Recovery => 0,
        },
        GoalRace::HalfMarathon => match category {
            Threshold => 3,
            Long | MarathonPace | RacePace | Progressive => 2,
            Mixed | Vo2Max | Intervals | HillRepeats => 1,
            Easy | Recovery => 0,
        },
        GoalRace::TenK => match category {
            Vo2Max | Threshold => 3,
            Intervals | RacePace => 2,
            Long | HillRepeats | Mixed | Progressive | MarathonPace => 1,
            Easy | Recovery => 0,
        },
        GoalRace::FiveK => match category {
            Vo2Max | Intervals => 3,
            HillRepeats | Threshold | RacePace => 2,
            Long | Mixed | Progressive | MarathonPace => 1,
            Easy | Recovery => 0,
        },
    }
}

/// Candidate ranking engine
pub struct CandidateScorer<'a> {
    config: &'a ScoringConfig,
    profiles: &'a SportProfileTable,
}

impl<'a> CandidateScorer<'a> {
    pub fn new(config: &'a ScoringConfig, profiles: &'a SportProfileTable) -> Self {
        CandidateScorer { config, profiles }
    }

    /// Load weighted for fatigue equivalence: anaerobic work counts extra
    fn weighted_load(&self, aerobic: f64, anaerobic: f64) -> f64 {
        aerobic + self.config.anaerobic_weight * anaerobic
    }

    /// Score and rank the week's planned runs against one activity.
    ///
    /// Only runs still in `Planned` status are considered. The result is
    /// sorted by similarity descending; ties keep original plan order
    /// (stable sort).
    pub fn rank(
        &self,
        week_runs: &[PlannedRun],
        load: &UniversalLoadResult,
        activity_sport: &Sport,
        activity_day: Weekday,
        context: &AthleteContext,
    ) -> Vec<Candidate> {
        let activity_ratio = load.anaerobic_ratio();
        let activity_weighted = self.weighted_load(load.aerobic_load, load.anaerobic_load);

        let mut candidates: Vec<Candidate> = week_runs
            .iter()
            .filter(|run| run.status == RunStatus::Planned)
            .map(|run| {
                let ratio_score = 1.0 - (activity_ratio - run.anaerobic_ratio()).abs();
                let run_weighted = self.weighted_load(run.aerobic_load, run.anaerobic_load);
                let load_score = 1.0
                    / (1.0
                        + (activity_weighted - run_weighted).abs() / self.config.load_smoothing);

                let mut similarity = self.config.ratio_weight * ratio_score
                    + self.config.load_weight * load_score;

                if run.day == activity_day {
                    similarity += self.config.same_day_bonus;
                }
                if run.is_long_run() {
                    similarity -= self.config.long_run_penalty;
                }
                similarity -= self.config.protection_penalty
                    * f64::from(protection_priority(context.goal, run.category));

                let can_replace = (!run.is_long_run() || context.injury_mode)
                    && !self
                        .profiles
                        .is_untouchable(activity_sport, run.category);

                Candidate {
                    run: run.clone(),
                    similarity,
                    run_load: run.total_load(),
                    can_replace,
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates
    }
}
