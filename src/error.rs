//! Error types shared by the registry, the countdown engine and the API

use thiserror::Error;

/// Every failure the timer can report. All of them are recoverable and
/// leave the state they were raised against untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("cannot start a workout without any rounds")]
    EmptyRegistry,

    #[error("you can only create a total of {max} rounds")]
    CapacityExceeded { max: usize },

    #[error("round {index} does not exist (registry holds {len} rounds)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid round time '{0}', expected MM:SS")]
    InvalidTime(String),

    #[error("unknown exercise '{0}'")]
    UnknownExercise(String),

    #[error("a workout is already running")]
    AlreadyRunning,

    /// Registry edits are only allowed while no run is active.
    #[error("rounds cannot be edited while a workout is running")]
    RunInProgress,

    #[error("countdown engine is not available")]
    EngineUnavailable,
}

pub type Result<T> = std::result::Result<T, TimerError>;
