//! Timer configuration and validation

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workout::{TimingKind, WorkoutTiming};

/// Which clock the timer runs and how it finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Counts down from the planned duration and finishes at zero
    Countdown,
    /// Counts up without an upper bound
    Countup,
    /// Counts up in repeating work units and finishes at the planned duration
    Interval,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::Countdown => "countdown",
            TimerKind::Countup => "countup",
            TimerKind::Interval => "interval",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerKind {
    type Err = TimerConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "countdown" => Ok(TimerKind::Countdown),
            "countup" => Ok(TimerKind::Countup),
            "interval" => Ok(TimerKind::Interval),
            other => Err(TimerConfigError::UnknownKind(other.to_string())),
        }
    }
}

/// Longest accepted duration or interval, one day
pub const MAX_MINUTES: u32 = 24 * 60;

/// Rejected timer configurations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerConfigError {
    #[error("unknown timer type: {0}")]
    UnknownKind(String),

    #[error("{kind} timer needs at least one minute, got {minutes}")]
    NonPositiveDuration { kind: TimerKind, minutes: u32 },

    #[error("interval length must be at least one minute")]
    NonPositiveInterval,

    #[error("{field} of {minutes} minutes exceeds the {max} minute limit")]
    TooLong {
        field: &'static str,
        minutes: u32,
        max: u32,
    },
}

/// Immutable per-instance timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    #[serde(rename = "type")]
    kind: TimerKind,
    initial_minutes: u32,
    interval_minutes: u32,
}

impl TimerConfig {
    /// Validate and build a configuration
    pub fn new(
        kind: TimerKind,
        initial_minutes: u32,
        interval_minutes: u32,
    ) -> Result<Self, TimerConfigError> {
        if interval_minutes == 0 {
            return Err(TimerConfigError::NonPositiveInterval);
        }
        if initial_minutes > MAX_MINUTES {
            return Err(TimerConfigError::TooLong {
                field: "initialMinutes",
                minutes: initial_minutes,
                max: MAX_MINUTES,
            });
        }
        if interval_minutes > MAX_MINUTES {
            return Err(TimerConfigError::TooLong {
                field: "intervalMinutes",
                minutes: interval_minutes,
                max: MAX_MINUTES,
            });
        }
        // Count-up timers have no finish line, so zero minutes is meaningful for them
        if initial_minutes == 0 && kind != TimerKind::Countup {
            return Err(TimerConfigError::NonPositiveDuration {
                kind,
                minutes: initial_minutes,
            });
        }

        Ok(Self {
            kind,
            initial_minutes,
            interval_minutes,
        })
    }

    pub fn countdown(minutes: u32) -> Result<Self, TimerConfigError> {
        Self::new(TimerKind::Countdown, minutes, 1)
    }

    pub fn countup(minutes: u32) -> Result<Self, TimerConfigError> {
        Self::new(TimerKind::Countup, minutes, 1)
    }

    pub fn interval(minutes: u32, interval_minutes: u32) -> Result<Self, TimerConfigError> {
        Self::new(TimerKind::Interval, minutes, interval_minutes)
    }

    /// Build a configuration from the timing block of a generated workout.
    ///
    /// `none` timings are shown as a countdown. Fractional work periods are
    /// rounded up to whole minutes.
    pub fn from_timing(timing: &WorkoutTiming) -> Result<Self, TimerConfigError> {
        let duration = whole_minutes(timing.duration);
        match timing.kind {
            TimingKind::Countdown | TimingKind::None => Self::countdown(duration),
            TimingKind::Countup => {
                let minutes = timing.time_cap_minutes.map(whole_minutes).unwrap_or(duration);
                Self::countup(minutes)
            }
            TimingKind::Interval => {
                let interval = timing
                    .intervals
                    .as_ref()
                    .map(|i| whole_minutes(i.work).max(1))
                    .unwrap_or(1);
                Self::interval(duration, interval)
            }
        }
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn initial_minutes(&self) -> u32 {
        self.initial_minutes
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    /// Planned duration in seconds
    pub fn initial_seconds(&self) -> u32 {
        self.initial_minutes.saturating_mul(60)
    }

    /// Value of the clock right after a reset
    pub fn starting_seconds(&self) -> u32 {
        match self.kind {
            TimerKind::Countdown => self.initial_seconds(),
            TimerKind::Countup | TimerKind::Interval => 0,
        }
    }

    /// One unit per minute, EMOM style
    pub fn is_per_minute(&self) -> bool {
        self.interval_minutes == 1
    }

    /// Number of rounds (per-minute) or sets (multi-minute) in the workout
    pub fn total_intervals(&self) -> u32 {
        if self.is_per_minute() {
            self.initial_minutes
        } else {
            self.initial_minutes.div_ceil(self.interval_minutes)
        }
    }
}

fn whole_minutes(minutes: f64) -> u32 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes.ceil().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::WorkoutIntervals;

    fn timing(kind: TimingKind, duration: f64) -> WorkoutTiming {
        WorkoutTiming {
            kind,
            duration,
            intervals: None,
            time_cap_minutes: None,
            description: "test timing".to_string(),
        }
    }

    #[test]
    fn rejects_zero_minute_countdown() {
        assert_eq!(
            TimerConfig::countdown(0),
            Err(TimerConfigError::NonPositiveDuration {
                kind: TimerKind::Countdown,
                minutes: 0
            })
        );
        assert!(TimerConfig::interval(0, 1).is_err());
    }

    #[test]
    fn rejects_zero_interval_length() {
        assert_eq!(
            TimerConfig::interval(12, 0),
            Err(TimerConfigError::NonPositiveInterval)
        );
    }

    #[test]
    fn rejects_durations_beyond_a_day() {
        assert_eq!(
            TimerConfig::interval(10, 1_073_741_824),
            Err(TimerConfigError::TooLong {
                field: "intervalMinutes",
                minutes: 1_073_741_824,
                max: MAX_MINUTES,
            })
        );
        assert!(matches!(
            TimerConfig::interval(u32::MAX, 2),
            Err(TimerConfigError::TooLong { field: "initialMinutes", .. })
        ));
        assert!(TimerConfig::countup(MAX_MINUTES + 1).is_err());

        let longest = TimerConfig::interval(MAX_MINUTES, MAX_MINUTES).unwrap();
        assert_eq!(longest.total_intervals(), 1);
        assert_eq!(longest.initial_seconds(), 86_400);
    }

    #[test]
    fn huge_timing_values_are_rejected() {
        let mut t = timing(TimingKind::Interval, 30.0);
        t.intervals = Some(WorkoutIntervals {
            work: 1e12,
            rest: 0.0,
            rounds: 1,
        });
        assert!(matches!(
            TimerConfig::from_timing(&t),
            Err(TimerConfigError::TooLong { field: "intervalMinutes", .. })
        ));
        assert!(TimerConfig::from_timing(&timing(TimingKind::Countdown, 5e9)).is_err());
    }

    #[test]
    fn countup_accepts_zero_minutes() {
        let config = TimerConfig::countup(0).unwrap();
        assert_eq!(config.starting_seconds(), 0);
    }

    #[test]
    fn parses_known_kinds_only() {
        assert_eq!("interval".parse::<TimerKind>(), Ok(TimerKind::Interval));
        assert_eq!(
            "tabata".parse::<TimerKind>(),
            Err(TimerConfigError::UnknownKind("tabata".to_string()))
        );
    }

    #[test]
    fn none_timing_maps_to_countdown() {
        let config = TimerConfig::from_timing(&timing(TimingKind::None, 15.0)).unwrap();
        assert_eq!(config.kind(), TimerKind::Countdown);
        assert_eq!(config.initial_seconds(), 900);
    }

    #[test]
    fn interval_timing_rounds_work_up() {
        let mut t = timing(TimingKind::Interval, 20.0);
        t.intervals = Some(WorkoutIntervals {
            work: 2.5,
            rest: 1.0,
            rounds: 5,
        });
        let config = TimerConfig::from_timing(&t).unwrap();
        assert_eq!(config.interval_minutes(), 3);
        assert_eq!(config.total_intervals(), 7);
    }

    #[test]
    fn countup_timing_prefers_time_cap() {
        let mut t = timing(TimingKind::Countup, 0.0);
        t.time_cap_minutes = Some(25.0);
        let config = TimerConfig::from_timing(&t).unwrap();
        assert_eq!(config.initial_minutes(), 25);
        assert_eq!(config.starting_seconds(), 0);
    }
}
