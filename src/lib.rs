//! WOD Timer - workout generation API with server-side workout timers
//!
//! This library provides countdown, count-up and interval timers with
//! per-minute movement cues, LLM-backed workout generation with a local
//! fallback, and an in-memory history of saved workouts.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod timer;
pub mod utils;
pub mod workout;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
