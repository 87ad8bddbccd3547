//! State management module
//!
//! This module contains the shared application state, the saved workout
//! store and the per-timer clock state.

pub mod app_state;
pub mod timer_state;
pub mod workout_store;

// Re-export main types
pub use app_state::{AppState, TimerEvent};
pub use timer_state::TimerState;
pub use workout_store::{
    HistoryFilters, HistoryPage, SaveWorkoutRequest, SavedWorkout, UpdateWorkoutRequest,
    WorkoutStore,
};
