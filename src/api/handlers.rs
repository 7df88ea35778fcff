//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::responses::{
    AddRoundRequest, ApiError, ApiResponse, HealthResponse, RoundView, SetLabelRequest,
    SetTimeRequest, StatusResponse,
};
use crate::{
    state::{AppState, RoundTime},
    utils::format_time,
};

type ApiResult = Result<Json<ApiResponse>, ApiError>;

// Extractors are taken as `Result`s so malformed paths and bodies are
// reported in the same `ApiResponse` shape as every other error.
type JsonBody<T> = Result<Json<T>, JsonRejection>;
type IndexPath = Result<Path<usize>, PathRejection>;

/// Handle GET /rounds - List configured rounds
pub async fn list_rounds_handler(State(state): State<Arc<AppState>>) -> Json<Vec<RoundView>> {
    Json(RoundView::list(&state.get_registry()))
}

/// Handle POST /rounds - Append a round
pub async fn add_round_handler(
    State(state): State<Arc<AppState>>,
    body: JsonBody<AddRoundRequest>,
) -> ApiResult {
    let Json(request) = body?;
    let time = request
        .time
        .as_deref()
        .map(str::parse::<RoundTime>)
        .transpose()?;
    let registry = state.add_round(request.label, time)?;
    Ok(Json(
        ApiResponse::ok(format!("Added {} round", request.label)).with_rounds(&registry),
    ))
}

/// Handle DELETE /rounds/:index - Remove a round
pub async fn remove_round_handler(
    State(state): State<Arc<AppState>>,
    index: IndexPath,
) -> ApiResult {
    let Path(index) = index?;
    let registry = state.remove_round(index)?;
    Ok(Json(
        ApiResponse::ok(format!("Removed round {}", index)).with_rounds(&registry),
    ))
}

/// Handle PUT /rounds/:index/label - Change a round's exercise
pub async fn set_label_handler(
    State(state): State<Arc<AppState>>,
    index: IndexPath,
    body: JsonBody<SetLabelRequest>,
) -> ApiResult {
    let Path(index) = index?;
    let Json(request) = body?;
    let registry = state.set_label(index, request.label)?;
    Ok(Json(
        ApiResponse::ok(format!("Round {} is now {}", index, request.label)).with_rounds(&registry),
    ))
}

/// Handle PUT /rounds/:index/time - Change a round's duration
pub async fn set_time_handler(
    State(state): State<Arc<AppState>>,
    index: IndexPath,
    body: JsonBody<SetTimeRequest>,
) -> ApiResult {
    let Path(index) = index?;
    let Json(request) = body?;
    let registry = match &request {
        SetTimeRequest::Text { time } => state.set_time_str(index, time)?,
        SetTimeRequest::Parts { minutes, seconds } => state.set_time(index, *minutes, *seconds)?,
    };
    let time = registry
        .get(index)
        .map(|round| round.time().to_string())
        .unwrap_or_default();
    Ok(Json(
        ApiResponse::ok(format!("Round {} set to {}", index, time)).with_rounds(&registry),
    ))
}

/// Handle POST /start - Begin the workout
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.start().await?;
    info!("Start endpoint called - workout running");
    Ok(Json(
        ApiResponse::ok(format!(
            "Workout started with {} rounds",
            snapshot.total_rounds
        ))
        .with_snapshot(snapshot),
    ))
}

/// Handle POST /stop - Cancel the workout
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let summary = state.stop().await?;
    let message = match &summary {
        Some(summary) => format!(
            "Workout cancelled after {} of {} rounds",
            summary.completed_rounds, summary.total_rounds
        ),
        None => "No workout was running".to_string(),
    };
    info!("Stop endpoint called - {}", message);
    Ok(Json(ApiResponse::ok(message).with_summary(summary)))
}

/// Handle GET /status - Return current engine and registry status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let engine = state.status();
    let remaining = engine
        .snapshot
        .as_ref()
        .map(|snapshot| format_time(snapshot.remaining_seconds));
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        engine,
        remaining,
        rounds: RoundView::list(&state.get_registry()),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream engine events as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events_tx.subscribe();

    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let sse = Event::default()
                        .event(event.name())
                        .json_data(&event)
                        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
                    return Some((Ok(sse), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
