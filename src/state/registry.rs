//! Ordered collection of rounds making up a workout

use serde::{Deserialize, Serialize};

use super::{Exercise, Round, RoundTime};
use crate::error::{Result, TimerError};

/// Maximum number of rounds a workout may hold.
pub const MAX_ROUNDS: usize = 5;

/// Rounds in execution order. Every operation either fully applies or
/// returns an error without touching the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistryFields")]
pub struct SessionRegistry {
    rounds: Vec<Round>,
}

#[derive(Deserialize)]
struct RegistryFields {
    rounds: Vec<Round>,
}

impl TryFrom<RegistryFields> for SessionRegistry {
    type Error = TimerError;

    fn try_from(fields: RegistryFields) -> Result<Self> {
        Self::from_rounds(fields.rounds)
    }
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { rounds: Vec::new() }
    }

    /// Registry with the single default `Random` round shown on first launch
    pub fn seeded() -> Self {
        Self {
            rounds: vec![Round::new(Exercise::Random)],
        }
    }

    /// Build a registry from pre-configured rounds, enforcing the capacity
    pub fn from_rounds(rounds: Vec<Round>) -> Result<Self> {
        if rounds.len() > MAX_ROUNDS {
            return Err(TimerError::CapacityExceeded { max: MAX_ROUNDS });
        }
        Ok(Self { rounds })
    }

    /// Append a round with the default 05:00 duration, returning its index
    pub fn add_round(&mut self, label: Exercise) -> Result<usize> {
        self.add_round_with_time(label, RoundTime::default())
    }

    pub fn add_round_with_time(&mut self, label: Exercise, time: RoundTime) -> Result<usize> {
        if self.rounds.len() >= MAX_ROUNDS {
            return Err(TimerError::CapacityExceeded { max: MAX_ROUNDS });
        }
        self.rounds.push(Round::with_time(label, time));
        Ok(self.rounds.len() - 1)
    }

    pub fn remove_round(&mut self, index: usize) -> Result<Round> {
        self.check_index(index)?;
        Ok(self.rounds.remove(index))
    }

    pub fn set_label(&mut self, index: usize, label: Exercise) -> Result<&Round> {
        self.check_index(index)?;
        let round = &mut self.rounds[index];
        round.set_label(label);
        Ok(round)
    }

    /// Set a round's time; components above 59 are clamped.
    pub fn set_time(&mut self, index: usize, minutes: u32, seconds: u32) -> Result<&Round> {
        self.check_index(index)?;
        let round = &mut self.rounds[index];
        round.set_time(RoundTime::new(minutes, seconds));
        Ok(round)
    }

    /// Set a round's time from an `MM:SS` string
    pub fn set_time_str(&mut self, index: usize, time: &str) -> Result<&Round> {
        self.check_index(index)?;
        let time: RoundTime = time.parse()?;
        self.set_time(index, time.minutes(), time.seconds())
    }

    pub fn get(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rounds.len() >= MAX_ROUNDS
    }

    /// Configured exercise time across all rounds, breaks excluded
    pub fn total_seconds(&self) -> u32 {
        self.rounds.iter().map(Round::duration_seconds).sum()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.rounds.len() {
            Ok(())
        } else {
            Err(TimerError::IndexOutOfRange {
                index,
                len: self.rounds.len(),
            })
        }
    }
}
