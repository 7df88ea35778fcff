//! Background tasks module
//!
//! This module contains the countdown task that runs alongside the HTTP server.

pub mod countdown_timer;
pub mod cues;

// Re-export main functions
pub use countdown_timer::{
    countdown_timer_task, spawn_countdown, CountdownChannels, CountdownHandle, EngineCommand,
    EngineEvent, TICK_PERIOD,
};
pub use cues::attach_terminal_cues;
