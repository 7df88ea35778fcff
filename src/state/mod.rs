//! State management module
//!
//! This module contains the workout data model and the shared application
//! state used by the HTTP layer and the countdown task.

pub mod app_state;
pub mod engine_status;
pub mod exercise;
pub mod registry;
pub mod round;

// Re-export main types
pub use app_state::AppState;
pub use engine_status::EngineStatus;
pub use exercise::Exercise;
pub use registry::{SessionRegistry, MAX_ROUNDS};
pub use round::{Round, RoundTime, DEFAULT_ROUND_TIME};
