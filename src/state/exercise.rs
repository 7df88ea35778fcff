//! Exercise catalogue used for round labels

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// A round label: one of the fixed exercises, or `Random` to have the
/// engine pick one of them each time the round starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Exercise {
    Plank,
    JumpingJacks,
    Burpees,
    Squats,
    Lunges,
    Random,
}

impl Exercise {
    /// Every selectable label, in picker order.
    pub const ALL: [Exercise; 6] = [
        Exercise::Plank,
        Exercise::JumpingJacks,
        Exercise::Burpees,
        Exercise::Squats,
        Exercise::Lunges,
        Exercise::Random,
    ];

    /// The labels a `Random` round can resolve to.
    pub fn concrete() -> &'static [Exercise] {
        &Self::ALL[..5]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Exercise::Plank => "Plank",
            Exercise::JumpingJacks => "Jumping Jacks",
            Exercise::Burpees => "Burpees",
            Exercise::Squats => "Squats",
            Exercise::Lunges => "Lunges",
            Exercise::Random => "Random",
        }
    }

    /// How to perform the exercise; empty for `Random`.
    pub fn description(&self) -> &'static str {
        match self {
            Exercise::Plank => "The most common plank is the forearm plank which is held in a push-up-like position, with the body's weight borne on forearms, elbows, and toes.",
            Exercise::JumpingJacks => "A jumping jack is performed by jumping to a position with the legs spread wide. The hands go overhead and then return to a position with the feet together and the arms at the sides.",
            Exercise::Burpees => "Do a squat, jump into a plank and go back up",
            Exercise::Squats => "A squat is a strength exercise in which the trainee lowers their hips from a standing position and then stands back up.",
            Exercise::Lunges => "A lunge can refer to any position of the human body where one leg is positioned forward with knee bent and foot flat on the ground while the other leg is positioned behind",
            Exercise::Random => "",
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(self, Exercise::Random)
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Exercise {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|exercise| exercise.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TimerError::UnknownExercise(wanted.to_string()))
    }
}

impl TryFrom<String> for Exercise {
    type Error = TimerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Exercise> for String {
    fn from(exercise: Exercise) -> Self {
        exercise.name().to_string()
    }
}
