//! Timer state machine
//!
//! Owns the authoritative clock value and the running/finished flags. Ticks
//! are applied by whoever drives the machine (see [`super::handle`]); the
//! machine itself never touches wall-clock time.

use tracing::{debug, info};

use super::config::{TimerConfig, TimerKind};
use crate::state::TimerState;

/// Callback fired when a run reaches its finish condition
pub type FinishCallback = Box<dyn FnMut() + Send>;

/// Callback fired when an interval timer enters a new one-minute work period.
/// Receives the number of minute boundaries crossed so far.
pub type IntervalCallback = Box<dyn FnMut(u32) + Send>;

/// Result of applying a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused or already finished, nothing changed
    Idle,
    /// The clock moved by one second
    Advanced,
    /// The clock moved and the run finished on this tick
    Finished,
}

pub struct TimerMachine {
    config: TimerConfig,
    state: TimerState,
    on_finish: Option<FinishCallback>,
    on_interval_change: Option<IntervalCallback>,
}

impl TimerMachine {
    /// Create a stopped machine showing the starting value for `config`
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            state: TimerState::new(config.starting_seconds()),
            on_finish: None,
            on_interval_change: None,
        }
    }

    pub fn with_on_finish(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn with_on_interval_change(mut self, callback: impl FnMut(u32) + Send + 'static) -> Self {
        self.on_interval_change = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished
    }

    pub fn start(&mut self) {
        self.state.is_running = true;
        self.state.is_finished = false;
        debug!("Timer started at {}", self.state.formatted());
    }

    pub fn pause(&mut self) {
        if self.state.is_running {
            debug!("Timer paused at {}", self.state.formatted());
        }
        self.state.is_running = false;
    }

    pub fn toggle(&mut self) {
        if self.state.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self) {
        self.state = TimerState::new(self.config.starting_seconds());
        debug!("Timer reset to {}", self.state.formatted());
    }

    /// Swap in a new configuration. The clock is always reset so no elapsed
    /// time carries over from the previous workout.
    pub fn replace_config(&mut self, config: TimerConfig) {
        self.config = config;
        self.reset();
    }

    /// Advance the clock by one second and evaluate the finish condition
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running || self.state.is_finished {
            return TickOutcome::Idle;
        }

        match self.config.kind() {
            TimerKind::Countdown => {
                let next = self.state.total_seconds.saturating_sub(1);
                self.state.total_seconds = next;
                if next == 0 {
                    return self.finish();
                }
            }
            TimerKind::Countup => {
                self.state.total_seconds = self.state.total_seconds.saturating_add(1);
            }
            TimerKind::Interval => {
                let next = self.state.total_seconds.saturating_add(1);
                self.state.total_seconds = next;

                if next % 60 == 0 {
                    self.state.interval_count += 1;
                    debug!("Work period {} started", self.state.interval_count + 1);
                    if let Some(callback) = self.on_interval_change.as_mut() {
                        callback(self.state.interval_count);
                    }
                }

                let limit = self.config.initial_seconds();
                if next >= limit {
                    self.state.total_seconds = limit;
                    return self.finish();
                }
            }
        }

        TickOutcome::Advanced
    }

    fn finish(&mut self) -> TickOutcome {
        self.state.is_finished = true;
        self.state.is_running = false;
        info!("{} timer finished at {}", self.config.kind(), self.state.formatted());
        if let Some(callback) = self.on_finish.as_mut() {
            callback();
        }
        TickOutcome::Finished
    }

    /// Completion in percent. Count-up timers have no upper bound and report 0.
    pub fn progress_percentage(&self) -> f64 {
        let initial = self.config.initial_seconds() as f64;
        let total = self.state.total_seconds as f64;
        match self.config.kind() {
            TimerKind::Countdown => (initial - total) / initial * 100.0,
            TimerKind::Interval => total / initial * 100.0,
            TimerKind::Countup => 0.0,
        }
    }

    /// 1-indexed round (per-minute mode) or set (multi-minute mode), clamped
    /// to the planned count. Always 0 for non-interval timers.
    pub fn current_interval(&self) -> u32 {
        if self.config.kind() != TimerKind::Interval {
            return 0;
        }

        let unit_seconds = self.config.interval_minutes() * 60;
        let current = self.state.total_seconds / unit_seconds + 1;
        current.min(self.config.total_intervals())
    }

    /// Caption shown above the clock face
    pub fn heading(&self) -> String {
        match self.config.kind() {
            TimerKind::Interval if self.config.is_per_minute() => {
                format!("Round {}/{}", self.current_interval(), self.config.total_intervals())
            }
            TimerKind::Interval => {
                format!("Set {}/{}", self.current_interval(), self.config.total_intervals())
            }
            TimerKind::Countdown => "Time Remaining".to_string(),
            TimerKind::Countup => "Elapsed Time".to_string(),
        }
    }
}

impl std::fmt::Debug for TimerMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerMachine")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
