//! Round definition and its `MM:SS` duration

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Exercise;
use crate::error::TimerError;

/// Duration given to a freshly added round.
pub const DEFAULT_ROUND_TIME: RoundTime = RoundTime { minutes: 5, seconds: 0 };

const MAX_COMPONENT: u32 = 59;

/// A user-entered round length. Both components are clamped to [0, 59].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RoundTimeFields")]
pub struct RoundTime {
    minutes: u32,
    seconds: u32,
}

impl RoundTime {
    pub fn new(minutes: u32, seconds: u32) -> Self {
        Self {
            minutes: minutes.min(MAX_COMPONENT),
            seconds: seconds.min(MAX_COMPONENT),
        }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn total_seconds(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }
}

#[derive(Deserialize)]
struct RoundTimeFields {
    minutes: u32,
    seconds: u32,
}

impl From<RoundTimeFields> for RoundTime {
    fn from(fields: RoundTimeFields) -> Self {
        Self::new(fields.minutes, fields.seconds)
    }
}

impl Default for RoundTime {
    fn default() -> Self {
        DEFAULT_ROUND_TIME
    }
}

impl fmt::Display for RoundTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

impl FromStr for RoundTime {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimerError::InvalidTime(s.to_string());
        let (minutes, seconds) = s.trim().split_once(':').ok_or_else(invalid)?;
        let minutes = minutes.trim().parse::<u32>().map_err(|_| invalid())?;
        let seconds = seconds.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::new(minutes, seconds))
    }
}

/// One configured exercise slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RoundFields")]
pub struct Round {
    label: Exercise,
    time: RoundTime,
    /// Always `time.total_seconds()`; refreshed by every mutator.
    duration_seconds: u32,
}

impl Round {
    pub fn new(label: Exercise) -> Self {
        Self::with_time(label, RoundTime::default())
    }

    pub fn with_time(label: Exercise, time: RoundTime) -> Self {
        Self {
            label,
            time,
            duration_seconds: time.total_seconds(),
        }
    }

    pub fn label(&self) -> Exercise {
        self.label
    }

    pub fn time(&self) -> RoundTime {
        self.time
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn set_label(&mut self, label: Exercise) {
        self.label = label;
    }

    pub fn set_time(&mut self, time: RoundTime) {
        self.time = time;
        self.duration_seconds = time.total_seconds();
    }
}

/// Incoming rounds carry no trusted duration; it is derived from `time`.
#[derive(Deserialize)]
struct RoundFields {
    label: Exercise,
    time: RoundTime,
}

impl From<RoundFields> for Round {
    fn from(fields: RoundFields) -> Self {
        Self::with_time(fields.label, fields.time)
    }
}

/// Parses the `LABEL@MM:SS` form used on the command line.
impl FromStr for Round {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('@') {
            Some((label, time)) => Ok(Self::with_time(label.parse()?, time.parse()?)),
            None => Ok(Self::new(s.parse()?)),
        }
    }
}
