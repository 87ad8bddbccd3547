//! Timer state structure

use serde::Serialize;

/// Mutable clock state owned by a single timer state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Elapsed seconds (count-up, interval) or remaining seconds (countdown)
    pub total_seconds: u32,
    pub is_running: bool,
    pub is_finished: bool,
    /// Minute boundaries crossed by an interval timer since the last reset
    pub interval_count: u32,
}

impl TimerState {
    /// Create a stopped state showing `total_seconds`
    pub fn new(total_seconds: u32) -> Self {
        Self {
            total_seconds,
            is_running: false,
            is_finished: false,
            interval_count: 0,
        }
    }

    pub fn minutes(&self) -> u32 {
        self.total_seconds / 60
    }

    pub fn seconds(&self) -> u32 {
        self.total_seconds % 60
    }

    /// Clock face as `MM:SS`
    pub fn formatted(&self) -> String {
        format!("{:02}:{:02}", self.minutes(), self.seconds())
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(0)
    }
}
