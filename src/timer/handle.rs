//! Timer handle, tick source and snapshot
//!
//! A [`TimerHandle`] owns one timer: the state machine, its movement
//! schedule and the tick source feeding it. All access goes through one
//! mutex, and each tick checks it still belongs to the current schedule
//! before touching state, so pausing, resetting or replacing a timer never
//! lets a stale tick through.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use serde::Serialize;
use tracing::{debug, info};

use super::{
    clock::{CancelToken, Clock},
    config::{TimerConfig, TimerKind},
    machine::{TickOutcome, TimerMachine},
    schedule::MovementSchedule,
};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Drives at most one repeating tick loop
pub struct TickSource {
    clock: Arc<dyn Clock>,
    active: Option<CancelToken>,
    generation: u64,
}

impl TickSource {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            active: None,
            generation: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether a tick scheduled under `generation` may still run
    pub fn is_current(&self, generation: u64) -> bool {
        self.active.is_some() && self.generation == generation
    }

    /// Start ticking unless already running. `make_task` receives the
    /// generation the task must present through [`TickSource::is_current`].
    pub fn ensure_running<F>(&mut self, make_task: F)
    where
        F: FnOnce(u64) -> Box<dyn FnMut() + Send>,
    {
        if self.active.is_some() {
            return;
        }
        self.generation += 1;
        let task = make_task(self.generation);
        self.active = Some(self.clock.schedule_repeating(TICK_PERIOD, task));
        debug!("Tick source started (generation {})", self.generation);
    }

    /// Stop ticking. No task from an earlier generation passes
    /// [`TickSource::is_current`] after this returns.
    pub fn stop(&mut self) {
        if let Some(token) = self.active.take() {
            self.generation += 1;
            token.cancel();
            debug!("Tick source stopped");
        }
    }
}

impl std::fmt::Debug for TickSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickSource")
            .field("active", &self.active.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

#[derive(Debug)]
struct TimerInner {
    machine: TimerMachine,
    schedule: MovementSchedule,
    ticker: TickSource,
}

impl TimerInner {
    fn tick(&mut self, generation: u64) {
        if !self.ticker.is_current(generation) {
            return;
        }
        match self.machine.tick() {
            TickOutcome::Finished | TickOutcome::Idle => self.ticker.stop(),
            TickOutcome::Advanced => {}
        }
    }

    fn snapshot(&self) -> TimerSnapshot {
        let config = self.machine.config();
        let state = self.machine.state();
        let current_interval = self.machine.current_interval();

        TimerSnapshot {
            kind: config.kind(),
            display: state.formatted(),
            minutes: state.minutes(),
            seconds: state.seconds(),
            total_seconds: state.total_seconds,
            is_running: state.is_running,
            is_finished: state.is_finished,
            progress: self.machine.progress_percentage(),
            current_interval,
            total_intervals: match config.kind() {
                TimerKind::Interval => config.total_intervals(),
                _ => 0,
            },
            heading: self.machine.heading(),
            interval_label: self.schedule.label_for(current_interval).to_string(),
        }
    }
}

/// Read-only view of a timer for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    #[serde(rename = "type")]
    pub kind: TimerKind,
    /// `MM:SS`
    pub display: String,
    pub minutes: u32,
    pub seconds: u32,
    pub total_seconds: u32,
    pub is_running: bool,
    pub is_finished: bool,
    pub progress: f64,
    pub current_interval: u32,
    pub total_intervals: u32,
    pub heading: String,
    /// Empty when no movement cue is available
    pub interval_label: String,
}

/// Owner of a running timer
#[derive(Debug)]
pub struct TimerHandle {
    inner: Arc<Mutex<TimerInner>>,
}

impl TimerHandle {
    /// Create a stopped timer. `workout_text` feeds the movement schedule.
    pub fn create(machine: TimerMachine, workout_text: &str, clock: Arc<dyn Clock>) -> Self {
        let schedule = MovementSchedule::parse(workout_text, machine.config());
        info!(
            "Created {} timer ({} min, {} cues)",
            machine.config().kind(),
            machine.config().initial_minutes(),
            schedule.len()
        );

        Self {
            inner: Arc::new(Mutex::new(TimerInner {
                machine,
                schedule,
                ticker: TickSource::new(clock),
            })),
        }
    }

    pub fn start(&self) -> TimerSnapshot {
        let mut inner = self.lock();
        inner.machine.start();
        self.sync_ticker(&mut inner);
        inner.snapshot()
    }

    pub fn pause(&self) -> TimerSnapshot {
        let mut inner = self.lock();
        inner.machine.pause();
        self.sync_ticker(&mut inner);
        inner.snapshot()
    }

    pub fn toggle(&self) -> TimerSnapshot {
        let mut inner = self.lock();
        inner.machine.toggle();
        self.sync_ticker(&mut inner);
        inner.snapshot()
    }

    pub fn reset(&self) -> TimerSnapshot {
        let mut inner = self.lock();
        inner.ticker.stop();
        inner.machine.reset();
        inner.snapshot()
    }

    /// Load a new workout into this timer. Pending ticks of the old
    /// configuration are cancelled before the clock is reset.
    pub fn replace_config(&self, config: TimerConfig, workout_text: &str) -> TimerSnapshot {
        let mut inner = self.lock();
        inner.ticker.stop();
        inner.machine.replace_config(config);
        inner.schedule = MovementSchedule::parse(workout_text, &config);
        info!("Timer replaced with {} timer ({} min)", config.kind(), config.initial_minutes());
        inner.snapshot()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.lock().snapshot()
    }

    pub fn config(&self) -> TimerConfig {
        *self.lock().machine.config()
    }

    /// Whether a tick loop is currently scheduled
    pub fn is_ticking(&self) -> bool {
        self.lock().ticker.is_active()
    }

    /// Stop ticking and release the timer
    pub fn dispose(self) {
        self.lock().ticker.stop();
        debug!("Timer disposed");
    }

    fn sync_ticker(&self, inner: &mut TimerInner) {
        if inner.machine.is_running() && !inner.machine.is_finished() {
            let weak = Arc::downgrade(&self.inner);
            inner.ticker.ensure_running(|generation| tick_task(weak, generation));
        } else {
            inner.ticker.stop();
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.lock().ticker.stop();
    }
}

fn tick_task(weak: Weak<Mutex<TimerInner>>, generation: u64) -> Box<dyn FnMut() + Send> {
    Box::new(move || {
        if let Some(inner) = weak.upgrade() {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .tick(generation);
        }
    })
}
