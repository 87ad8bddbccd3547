//! Timer event listener background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::{AppState, TimerEvent};

/// Background task that logs finish and interval notifications from all timers
pub async fn timer_events_task(state: Arc<AppState>) {
    info!("Starting timer event task");

    let mut event_rx = state.timer_event_tx.subscribe();
    // The task must not keep the state (and its sender) alive on its own
    drop(state);

    loop {
        match event_rx.recv().await {
            Ok(TimerEvent::Finished { id }) => {
                info!("Timer {} finished", id);
            }
            Ok(TimerEvent::IntervalChanged { id, interval }) => {
                debug!("Timer {} entered work period {}", id, interval + 1);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Timer event task lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Timer event channel closed, stopping task");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::UnconfiguredGenerator,
        timer::{ManualClock, TimerConfig},
    };

    #[tokio::test]
    async fn stops_when_state_is_dropped() {
        let clock = ManualClock::new();
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            Arc::new(UnconfiguredGenerator),
            Arc::new(clock.clone()),
        ));
        let task = tokio::spawn(timer_events_task(Arc::clone(&state)));
        tokio::task::yield_now().await;

        let (id, _) = state.create_timer(TimerConfig::countdown(1).unwrap(), "").unwrap();
        state.with_timer(id, |timer| timer.start()).unwrap();
        clock.advance(60);

        drop(state);
        tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .expect("task should stop once the channel closes")
            .unwrap();
    }
}
