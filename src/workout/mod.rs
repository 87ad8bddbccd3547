//! Workout model
//!
//! Structured workouts as produced by the generator, their validation and
//! repair, and timing extraction for plain-text workouts.

pub mod parser;
pub mod types;
pub mod validation;

// Re-export main types
pub use parser::{parse_workout_timing, ParsedTiming};
pub use types::{
    Difficulty, TimingKind, TimingSource, WorkoutContent, WorkoutData, WorkoutFormat,
    WorkoutIntervals, WorkoutMetadata, WorkoutResponse, WorkoutSystemInfo, WorkoutTiming,
    SCHEMA_VERSION,
};
pub use validation::{
    default_response, default_timing, repair_response, timing_confidence, timing_matches_format,
    validate_response,
};
