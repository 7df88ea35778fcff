//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{
    engine::BREAK_DURATION_SECS,
    error::Result,
    state::{Round, SessionRegistry},
};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "round-timer")]
#[command(about = "An interval-workout countdown service with rest breaks")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Rest period between rounds in seconds
    #[arg(long, default_value_t = BREAK_DURATION_SECS)]
    pub break_secs: u32,

    /// Milliseconds between countdown ticks (each tick counts as one second)
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// Pre-configured round as LABEL@MM:SS, e.g. "Plank@00:30" (repeatable)
    #[arg(short, long = "round", value_name = "LABEL@MM:SS")]
    pub rounds: Vec<String>,

    /// Ring the terminal bell when a phase starts or ends
    #[arg(long)]
    pub beep: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Registry to start with: the `--round` values, or the default
    /// single `Random` round when none were given
    pub fn seed_registry(&self) -> Result<SessionRegistry> {
        if self.rounds.is_empty() {
            return Ok(SessionRegistry::seeded());
        }
        let rounds = self
            .rounds
            .iter()
            .map(|spec| spec.parse::<Round>())
            .collect::<Result<Vec<_>>>()?;
        SessionRegistry::from_rounds(rounds)
    }
}
