//! API request and response structures

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{RunSummary, TickSnapshot},
    error::TimerError,
    state::{EngineStatus, Exercise, Round, SessionRegistry},
};

/// Body of `POST /rounds`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRoundRequest {
    pub label: Exercise,
    /// `MM:SS`; defaults to 05:00
    #[serde(default)]
    pub time: Option<String>,
}

/// Body of `PUT /rounds/:index/label`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLabelRequest {
    pub label: Exercise,
}

/// Body of `PUT /rounds/:index/time`: either `{"time": "MM:SS"}` or
/// `{"minutes": m, "seconds": s}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetTimeRequest {
    Text { time: String },
    Parts { minutes: u32, seconds: u32 },
}

/// One round as shown to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundView {
    pub index: usize,
    pub label: Exercise,
    /// How to perform the exercise; empty for `Random` rounds.
    pub description: String,
    pub time: String,
    pub duration_seconds: u32,
}

impl RoundView {
    pub fn list(registry: &SessionRegistry) -> Vec<RoundView> {
        registry
            .rounds()
            .iter()
            .enumerate()
            .map(|(index, round)| RoundView::new(index, round))
            .collect()
    }

    fn new(index: usize, round: &Round) -> Self {
        Self {
            index,
            label: round.label(),
            description: round.label().description().to_string(),
            time: round.time().to_string(),
            duration_seconds: round.duration_seconds(),
        }
    }
}

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<Vec<RoundView>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<TickSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            rounds: None,
            snapshot: None,
            summary: None,
        }
    }

    pub fn ok(message: String) -> Self {
        Self::new("ok", message)
    }

    /// Create an error response
    pub fn error(message: String) -> Self {
        Self::new("error", message)
    }

    pub fn with_rounds(mut self, registry: &SessionRegistry) -> Self {
        self.rounds = Some(RoundView::list(registry));
        self
    }

    pub fn with_snapshot(mut self, snapshot: TickSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_summary(mut self, summary: Option<RunSummary>) -> Self {
        self.summary = summary;
        self
    }
}

/// Error returned by handlers, rendered as an `ApiResponse` with a
/// status code matching the failure
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn status_for(error: &TimerError) -> StatusCode {
    match error {
        TimerError::EmptyRegistry
        | TimerError::AlreadyRunning
        | TimerError::RunInProgress
        | TimerError::CapacityExceeded { .. } => StatusCode::CONFLICT,
        TimerError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        TimerError::InvalidTime(_) | TimerError::UnknownExercise(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TimerError::EngineUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<TimerError> for ApiError {
    fn from(error: TimerError) -> Self {
        Self {
            status: status_for(&error),
            message: error.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(ApiResponse::error(self.message))).into_response()
    }
}

/// Status response with engine and registry information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub engine: EngineStatus,
    /// Remaining time of the current phase as `MM:SS`
    pub remaining: Option<String>,
    pub rounds: Vec<RoundView>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_errors_map_to_status_codes() {
        let cases = [
            (TimerError::EmptyRegistry, StatusCode::CONFLICT),
            (TimerError::CapacityExceeded { max: 5 }, StatusCode::CONFLICT),
            (TimerError::IndexOutOfRange { index: 9, len: 1 }, StatusCode::NOT_FOUND),
            (TimerError::InvalidTime("x".to_string()), StatusCode::UNPROCESSABLE_ENTITY),
            (TimerError::EngineUnavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            let message = error.to_string();
            let api_error = ApiError::from(error);
            assert_eq!(api_error.status_code(), status);
            assert_eq!(api_error.message(), message);
        }
    }

    #[test]
    fn random_rounds_have_no_description() {
        let registry = SessionRegistry::from_rounds(vec![
            Round::new(Exercise::Random),
            Round::new(Exercise::Squats),
        ])
        .unwrap();
        let views = RoundView::list(&registry);
        assert_eq!(views[0].description, "");
        assert_eq!(views[1].description, Exercise::Squats.description());
    }
}
