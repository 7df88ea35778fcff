//! Round Timer - An interval-workout countdown service
//!
//! This library provides the workout data model, the countdown state
//! machine that cycles through rounds and rest breaks, and an HTTP surface
//! for editing rounds and controlling a run.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::CountdownEngine;
pub use error::TimerError;
pub use state::{AppState, SessionRegistry};
pub use utils::signals::shutdown_signal;
