//! Observable views of the countdown engine

use serde::{Deserialize, Serialize};

use crate::state::Exercise;

/// Label shown while resting between rounds.
pub const BREAK_LABEL: &str = "Pause";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Exercise,
    Break,
}

/// Where the engine is. Finished and cancelled runs drop straight back
/// to `Idle`; how the last run ended is reported as a [`RunOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    RunningExercise,
    RunningBreak,
}

impl EngineState {
    pub fn is_running(&self) -> bool {
        !matches!(self, EngineState::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Finished,
    Cancelled,
}

/// State emitted on every tick of an active run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub phase: Phase,
    /// Exercise resolved for the current round; never `Random`.
    pub resolved_label: Exercise,
    /// What a renderer should show: the exercise name, or "Pause" in a break.
    pub display_label: String,
    /// How to perform the current exercise; empty during a break.
    pub description: String,
    pub remaining_seconds: u32,
    pub round_index: usize,
    pub completed_count: usize,
    pub total_rounds: usize,
}

impl TickSnapshot {
    /// Fraction of rounds completed, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.total_rounds == 0 {
            return 0.0;
        }
        (self.completed_count as f64 / self.total_rounds as f64).clamp(0.0, 1.0)
    }
}

/// Handed to finish and cancel listeners once a run is over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub total_rounds: usize,
    pub completed_rounds: usize,
    /// Exercises actually performed, one per round entered.
    pub resolved_labels: Vec<Exercise>,
    /// Ticks processed before the run ended.
    pub ticks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(completed_count: usize, total_rounds: usize) -> TickSnapshot {
        TickSnapshot {
            phase: Phase::Exercise,
            resolved_label: Exercise::Plank,
            display_label: "Plank".to_string(),
            description: Exercise::Plank.description().to_string(),
            remaining_seconds: 0,
            round_index: 0,
            completed_count,
            total_rounds,
        }
    }

    #[test]
    fn progress_is_fraction_of_completed_rounds() {
        assert_eq!(snapshot(0, 4).progress(), 0.0);
        assert_eq!(snapshot(1, 4).progress(), 0.25);
        assert_eq!(snapshot(4, 4).progress(), 1.0);
    }

    #[test]
    fn progress_handles_degenerate_totals() {
        assert_eq!(snapshot(0, 0).progress(), 0.0);
        assert_eq!(snapshot(5, 4).progress(), 1.0);
    }

    #[test]
    fn phase_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Break).unwrap(), "\"break\"");
        assert_eq!(
            serde_json::to_string(&EngineState::RunningExercise).unwrap(),
            "\"running_exercise\""
        );
    }
}
