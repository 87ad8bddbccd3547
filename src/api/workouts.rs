//! Saved workout handlers
//!
//! Every route needs the caller's identity in the `x-user-id` header; a user
//! only ever sees and changes their own workouts.

use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use tracing::warn;
use uuid::Uuid;

use crate::state::{
    AppState, HistoryFilters, HistoryPage, SaveWorkoutRequest, SavedWorkout,
    UpdateWorkoutRequest,
};
use super::responses::{ApiError, MessageResponse};

pub const USER_ID_HEADER: &str = "x-user-id";

fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            warn!("Workout request without {} header", USER_ID_HEADER);
            ApiError::Unauthorized
        })
}

/// Handle POST /api/workouts - Save a workout to the caller's history
pub async fn save_workout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SaveWorkoutRequest>,
) -> Result<(StatusCode, Json<SavedWorkout>), ApiError> {
    let user = user_id(&headers)?;

    let errors = request.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let saved = state.workouts.save(&user, request)?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Handle GET /api/workouts - Filtered, paginated history
pub async fn workout_history_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(filters): Query<HistoryFilters>,
) -> Result<Json<HistoryPage>, ApiError> {
    let user = user_id(&headers)?;
    Ok(Json(state.workouts.history(&user, &filters)?))
}

/// Handle PATCH /api/workouts/:id - Update notes, favorite flag or rating
pub async fn update_workout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWorkoutRequest>,
) -> Result<Json<SavedWorkout>, ApiError> {
    let user = user_id(&headers)?;

    let errors = request.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    state
        .workouts
        .update(&user, id, request)?
        .map(Json)
        .ok_or(ApiError::NotFound("Workout"))
}

/// Handle DELETE /api/workouts/:id
pub async fn delete_workout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = user_id(&headers)?;

    if state.workouts.delete(&user, id)? {
        Ok(Json(MessageResponse::new("Workout deleted successfully")))
    } else {
        Err(ApiError::NotFound("Workout"))
    }
}
