//! Countdown engine module
//!
//! The state machine that sequences rounds and breaks, plus the types it
//! emits and the seam used to resolve `Random` labels.

pub mod countdown;
pub mod resolver;
pub mod snapshot;

pub use countdown::{CountdownEngine, BREAK_DURATION_SECS};
pub use resolver::{FixedResolver, LabelResolver, RandomResolver};
pub use snapshot::{EngineState, Phase, RunOutcome, RunSummary, TickSnapshot, BREAK_LABEL};
