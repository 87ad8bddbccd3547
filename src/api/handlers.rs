//! HTTP endpoint handlers for health, generation, feedback and timers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    services::{generate_workout, GenerateRequest, GeneratedWorkout},
    state::AppState,
    timer::{TimerConfig, TimerHandle, TimerKind, TimerSnapshot},
    workout::WorkoutTiming,
};
use super::responses::{ApiError, CreatedTimer, HealthResponse, MessageResponse};

/// Timer definition, either explicit or taken from a generated workout's timing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub initial_minutes: Option<u32>,
    pub interval_minutes: Option<u32>,
    pub timing: Option<WorkoutTiming>,
    /// Workout text used for movement cues
    #[serde(default)]
    pub workout_text: String,
}

impl TimerRequest {
    /// Validate into a timer configuration
    pub fn config(&self) -> Result<TimerConfig, ApiError> {
        if let Some(timing) = &self.timing {
            return Ok(TimerConfig::from_timing(timing)?);
        }

        let kind: TimerKind = self
            .kind
            .as_deref()
            .ok_or_else(|| ApiError::Validation(vec!["type is required".to_string()]))?
            .parse()?;
        let minutes = self
            .initial_minutes
            .ok_or_else(|| ApiError::Validation(vec!["initialMinutes is required".to_string()]))?;

        Ok(TimerConfig::new(kind, minutes, self.interval_minutes.unwrap_or(1))?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub feedback: String,
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.get_uptime(), state.timer_count()))
}

/// Handle POST /api/generateWod - Generate a workout, falling back to a default one
pub async fn generate_wod_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Json<GeneratedWorkout> {
    Json(generate_workout(state.generator.as_ref(), &request).await)
}

/// Handle POST /api/feedback - Record user feedback
pub async fn feedback_handler(
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let feedback = request.feedback.trim();
    if feedback.is_empty() {
        return Err(ApiError::Validation(vec!["Feedback cannot be empty".to_string()]));
    }

    info!(
        "Feedback received from {}: {}",
        request.email.as_deref().unwrap_or("anonymous"),
        feedback
    );
    Ok(Json(MessageResponse::new("Feedback received")))
}

/// Handle POST /api/timers - Create a stopped timer
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TimerRequest>,
) -> Result<(StatusCode, Json<CreatedTimer>), ApiError> {
    let config = request.config()?;
    let (id, timer) = state.create_timer(config, &request.workout_text)?;
    Ok((StatusCode::CREATED, Json(CreatedTimer { id, timer })))
}

/// Handle GET /api/timers/:id - Current timer snapshot
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    control(&state, id, TimerHandle::snapshot)
}

/// Handle PUT /api/timers/:id - Load a new workout into an existing timer
pub async fn replace_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<TimerRequest>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    let config = request.config()?;
    control(&state, id, |timer| timer.replace_config(config, &request.workout_text))
}

/// Handle POST /api/timers/:id/start
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    control(&state, id, TimerHandle::start)
}

/// Handle POST /api/timers/:id/pause
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    control(&state, id, TimerHandle::pause)
}

/// Handle POST /api/timers/:id/toggle
pub async fn toggle_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    control(&state, id, TimerHandle::toggle)
}

/// Handle POST /api/timers/:id/reset
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    control(&state, id, TimerHandle::reset)
}

/// Handle DELETE /api/timers/:id - Stop and discard a timer
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.remove_timer(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Timer"))
    }
}

fn control<F>(state: &AppState, id: Uuid, action: F) -> Result<Json<TimerSnapshot>, ApiError>
where
    F: FnOnce(&TimerHandle) -> TimerSnapshot,
{
    let snapshot = state
        .with_timer(id, action)?
        .ok_or(ApiError::NotFound("Timer"))?;
    debug!("Timer {} at {} (running: {})", id, snapshot.display, snapshot.is_running);
    Ok(Json(snapshot))
}
