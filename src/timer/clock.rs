//! Clocks that drive timer ticks
//!
//! A [`Clock`] runs a task repeatedly until the returned [`CancelToken`] is
//! cancelled or dropped. [`TokioClock`] uses wall-clock time on the tokio
//! runtime; [`ManualClock`] only fires when told to, which keeps tests free
//! of real delays.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use tokio::{runtime::Handle, time::MissedTickBehavior};
use tracing::{debug, trace};

/// Work scheduled on a clock
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// Source of periodic callbacks
pub trait Clock: Send + Sync {
    /// Run `task` once every `period` until the token is cancelled
    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> CancelToken;
}

/// Stops a scheduled task when cancelled or dropped
#[must_use = "dropping a CancelToken stops the scheduled task"]
pub struct CancelToken {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelToken {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for CancelToken {
    fn drop(&mut self) {
        self.fire();
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("pending", &self.cancel.is_some())
            .finish()
    }
}

/// Wall-clock ticks on a tokio runtime
#[derive(Debug, Clone)]
pub struct TokioClock {
    runtime: Handle,
}

impl TokioClock {
    /// Use the runtime of the calling task.
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    pub fn with_handle(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn schedule_repeating(&self, period: Duration, mut task: RepeatingTask) -> CancelToken {
        let handle = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            // Late ticks are replayed so every elapsed period produces exactly one call
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            // The first tick of a tokio interval completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                task();
            }
        });
        debug!("Scheduled repeating task every {:?}", period);

        let abort = handle.abort_handle();
        CancelToken::new(move || {
            trace!("Cancelling repeating task");
            abort.abort();
        })
    }
}

#[derive(Default)]
struct ManualInner {
    next_id: u64,
    tasks: BTreeMap<u64, RepeatingTask>,
    // Tasks cancelled while they were running
    cancelled: HashSet<u64>,
}

/// Virtual clock advanced explicitly with [`ManualClock::advance`]
#[derive(Clone, Default)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every scheduled task `periods` times, in scheduling order
    pub fn advance(&self, periods: u32) {
        for _ in 0..periods {
            let ids: Vec<u64> = self.lock().tasks.keys().copied().collect();
            for id in ids {
                // Run outside the lock so a task may cancel itself
                let task = self.lock().tasks.remove(&id);
                let Some(mut task) = task else {
                    continue;
                };
                task();

                let mut inner = self.lock();
                if !inner.cancelled.remove(&id) {
                    inner.tasks.insert(id, task);
                }
            }
        }
    }

    /// Number of live scheduled tasks
    pub fn active_tasks(&self) -> usize {
        self.lock().tasks.len()
    }

    fn lock(&self) -> MutexGuard<'_, ManualInner> {
        lock_inner(&self.inner)
    }
}

impl Clock for ManualClock {
    fn schedule_repeating(&self, _period: Duration, task: RepeatingTask) -> CancelToken {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.tasks.insert(id, task);
            id
        };

        let weak: Weak<Mutex<ManualInner>> = Arc::downgrade(&self.inner);
        CancelToken::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = lock_inner(&inner);
                if inner.tasks.remove(&id).is_none() {
                    inner.cancelled.insert(id);
                }
            }
        })
    }
}

fn lock_inner(inner: &Mutex<ManualInner>) -> MutexGuard<'_, ManualInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualClock")
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counter_task(counter: &Arc<AtomicU32>) -> RepeatingTask {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn manual_clock_fires_once_per_period() {
        let clock = ManualClock::new();
        let count = Arc::new(AtomicU32::new(0));
        let token = clock.schedule_repeating(Duration::from_secs(1), counter_task(&count));

        clock.advance(5);
        assert_eq!(count.load(Ordering::SeqCst), 5);

        token.cancel();
        clock.advance(5);
        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert_eq!(clock.active_tasks(), 0);
    }

    #[test]
    fn dropping_token_cancels() {
        let clock = ManualClock::new();
        let count = Arc::new(AtomicU32::new(0));
        drop(clock.schedule_repeating(Duration::from_secs(1), counter_task(&count)));

        clock.advance(3);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn task_can_cancel_itself() {
        let clock = ManualClock::new();
        let count = Arc::new(AtomicU32::new(0));
        let slot: Arc<Mutex<Option<CancelToken>>> = Arc::new(Mutex::new(None));

        let counter = Arc::clone(&count);
        let own_token = Arc::clone(&slot);
        let token = clock.schedule_repeating(
            Duration::from_secs(1),
            Box::new(move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 2 {
                    if let Some(token) = own_token.lock().unwrap().take() {
                        token.cancel();
                    }
                }
            }),
        );
        *slot.lock().unwrap() = Some(token);

        clock.advance(10);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(clock.active_tasks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_ticks_every_period() {
        let clock = TokioClock::new();
        let count = Arc::new(AtomicU32::new(0));
        let token = clock.schedule_repeating(Duration::from_secs(1), counter_task(&count));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        token.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
