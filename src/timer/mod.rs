//! Workout timer
//!
//! Countdown, count-up and interval clocks with play/pause/reset, progress
//! and per-interval movement cues.

pub mod clock;
pub mod config;
pub mod handle;
pub mod machine;
pub mod schedule;

// Re-export main types
pub use clock::{CancelToken, Clock, ManualClock, TokioClock};
pub use config::{TimerConfig, TimerConfigError, TimerKind};
pub use handle::{TickSource, TimerHandle, TimerSnapshot};
pub use machine::{TickOutcome, TimerMachine};
pub use schedule::MovementSchedule;
