//! Countdown status published by the countdown task

use serde::{Deserialize, Serialize};

use crate::engine::{CountdownEngine, EngineState, RunOutcome, RunSummary, TickSnapshot};

/// Latest view of the countdown engine, kept in a `watch` channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub state: EngineState,
    /// State of the active run, `None` while idle.
    pub snapshot: Option<TickSnapshot>,
    pub progress: f64,
    pub last_outcome: Option<RunOutcome>,
    /// Summary of the most recently ended run.
    pub last_summary: Option<RunSummary>,
}

impl EngineStatus {
    /// Status of an engine that has never run
    pub fn idle() -> Self {
        Self {
            state: EngineState::Idle,
            snapshot: None,
            progress: 0.0,
            last_outcome: None,
            last_summary: None,
        }
    }

    pub fn from_engine(engine: &CountdownEngine, last_summary: Option<RunSummary>) -> Self {
        let snapshot = engine.snapshot();
        let progress = match (&snapshot, &last_summary) {
            (Some(snapshot), _) => snapshot.progress(),
            (None, Some(summary)) if summary.total_rounds > 0 => {
                summary.completed_rounds as f64 / summary.total_rounds as f64
            }
            _ => 0.0,
        };
        Self {
            state: engine.state(),
            snapshot,
            progress,
            last_outcome: engine.last_outcome(),
            last_summary,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self::idle()
    }
}
