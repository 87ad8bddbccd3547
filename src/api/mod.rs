//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;
pub mod workouts;

use std::sync::Arc;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;
use workouts::*;

// Re-export main types
pub use responses::{ApiError, CreatedTimer, ErrorResponse, HealthResponse, MessageResponse};

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/generateWod", post(generate_wod_handler))
        .route("/api/feedback", post(feedback_handler))
        // Timers
        .route("/api/timers", post(create_timer_handler))
        .route(
            "/api/timers/:id",
            get(get_timer_handler)
                .put(replace_timer_handler)
                .delete(delete_timer_handler),
        )
        .route("/api/timers/:id/start", post(start_timer_handler))
        .route("/api/timers/:id/pause", post(pause_timer_handler))
        .route("/api/timers/:id/toggle", post(toggle_timer_handler))
        .route("/api/timers/:id/reset", post(reset_timer_handler))
        // Saved workouts
        .route(
            "/api/workouts",
            post(save_workout_handler).get(workout_history_handler),
        )
        .route(
            "/api/workouts/:id",
            patch(update_workout_handler).delete(delete_workout_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
