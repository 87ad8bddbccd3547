//! Main application state management

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Instant,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::WorkoutStore;
use crate::{
    services::WorkoutGenerator,
    timer::{Clock, TimerConfig, TimerHandle, TimerMachine, TimerSnapshot},
};

/// Notifications emitted by running timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Finished { id: Uuid },
    /// An interval timer entered work period `interval`
    IntervalChanged { id: Uuid, interval: u32 },
}

/// Main application state shared by all handlers and background tasks
pub struct AppState {
    /// Server-side timers by id
    pub timers: Arc<Mutex<HashMap<Uuid, TimerHandle>>>,
    /// Saved workouts per user
    pub workouts: WorkoutStore,
    pub generator: Arc<dyn WorkoutGenerator>,
    /// Clock driving every timer's tick loop
    pub clock: Arc<dyn Clock>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Channel for timer finish and interval notifications
    pub timer_event_tx: broadcast::Sender<TimerEvent>,
}

impl AppState {
    /// Create a new AppState with no timers and an empty workout store
    pub fn new(
        port: u16,
        host: String,
        generator: Arc<dyn WorkoutGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (timer_event_tx, _) = broadcast::channel(100);

        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            workouts: WorkoutStore::new(),
            generator,
            clock,
            start_time: Instant::now(),
            port,
            host,
            timer_event_tx,
        }
    }

    /// Create a stopped timer and register it under a fresh id
    pub fn create_timer(
        &self,
        config: TimerConfig,
        workout_text: &str,
    ) -> Result<(Uuid, TimerSnapshot), String> {
        let id = Uuid::new_v4();
        let finish_tx = self.timer_event_tx.clone();
        let interval_tx = self.timer_event_tx.clone();

        // Sending with no subscribers is fine, so the results are ignored
        let machine = TimerMachine::new(config)
            .with_on_finish(move || {
                let _ = finish_tx.send(TimerEvent::Finished { id });
            })
            .with_on_interval_change(move |interval| {
                let _ = interval_tx.send(TimerEvent::IntervalChanged { id, interval });
            });

        let handle = TimerHandle::create(machine, workout_text, Arc::clone(&self.clock));
        let snapshot = handle.snapshot();

        let mut timers = self.timers.lock()
            .map_err(|e| format!("Failed to lock timers: {}", e))?;
        timers.insert(id, handle);
        info!("Registered timer {} ({} active)", id, timers.len());

        Ok((id, snapshot))
    }

    /// Run `action` against a timer. `Ok(None)` when there is no such timer.
    pub fn with_timer<F, R>(&self, id: Uuid, action: F) -> Result<Option<R>, String>
    where
        F: FnOnce(&TimerHandle) -> R,
    {
        let timers = self.timers.lock()
            .map_err(|e| format!("Failed to lock timers: {}", e))?;
        Ok(timers.get(&id).map(action))
    }

    /// Unregister and dispose a timer. Returns whether it existed.
    pub fn remove_timer(&self, id: Uuid) -> Result<bool, String> {
        let removed = self.timers.lock()
            .map_err(|e| format!("Failed to lock timers: {}", e))?
            .remove(&id);

        match removed {
            Some(handle) => {
                handle.dispose();
                info!("Removed timer {}", id);
                Ok(true)
            }
            None => {
                debug!("Timer {} not found for removal", id);
                Ok(false)
            }
        }
    }

    /// Stop and drop every timer
    pub fn dispose_all_timers(&self) {
        let drained: Vec<TimerHandle> = match self.timers.lock() {
            Ok(mut timers) => timers.drain().map(|(_, handle)| handle).collect(),
            Err(e) => {
                warn!("Failed to lock timers for shutdown: {}", e);
                return;
            }
        };

        let count = drained.len();
        drained.into_iter().for_each(TimerHandle::dispose);
        if count > 0 {
            info!("Disposed {} timers", count);
        }
    }

    /// Number of registered timers
    pub fn timer_count(&self) -> usize {
        self.timers.lock().map(|timers| timers.len()).unwrap_or(0)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
