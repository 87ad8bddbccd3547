//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod timer_events;

// Re-export main functions
pub use timer_events::timer_events_task;
