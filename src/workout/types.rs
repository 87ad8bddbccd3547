//! Workout data structures exchanged with the generator and API clients

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version stamped into every generated workout
pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutFormat {
    Amrap,
    Emom,
    ForTime,
    Intervals,
    Chipper,
    StrengthMetcon,
}

impl WorkoutFormat {
    pub const ALL: [WorkoutFormat; 6] = [
        WorkoutFormat::Amrap,
        WorkoutFormat::Emom,
        WorkoutFormat::ForTime,
        WorkoutFormat::Intervals,
        WorkoutFormat::Chipper,
        WorkoutFormat::StrengthMetcon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutFormat::Amrap => "amrap",
            WorkoutFormat::Emom => "emom",
            WorkoutFormat::ForTime => "for_time",
            WorkoutFormat::Intervals => "intervals",
            WorkoutFormat::Chipper => "chipper",
            WorkoutFormat::StrengthMetcon => "strength_metcon",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.as_str() == name)
    }
}

impl fmt::Display for WorkoutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

/// Timer type requested by a workout. `None` is displayed as a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingKind {
    Countdown,
    Countup,
    Interval,
    None,
}

impl TimingKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "countdown" => Some(TimingKind::Countdown),
            "countup" => Some(TimingKind::Countup),
            "interval" => Some(TimingKind::Interval),
            "none" => Some(TimingKind::None),
            _ => None,
        }
    }
}

/// How the timing of a workout was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingSource {
    Ai,
    Parsed,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutIntervals {
    /// Work period in minutes
    pub work: f64,
    /// Rest period in minutes
    pub rest: f64,
    pub rounds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTiming {
    #[serde(rename = "type")]
    pub kind: TimingKind,
    /// Total duration in minutes, 0 for open-ended workouts
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervals: Option<WorkoutIntervals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_cap_minutes: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutContent {
    pub text: String,
    pub format: WorkoutFormat,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutMetadata {
    pub movements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSystemInfo {
    pub generated: DateTime<Utc>,
    pub version: String,
    pub source: TimingSource,
    /// 0-1 confidence in the timing block
    pub confidence: f64,
}

/// A complete generated workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutResponse {
    pub workout: WorkoutContent,
    pub timing: WorkoutTiming,
    pub metadata: WorkoutMetadata,
    pub system: WorkoutSystemInfo,
}

/// Generator reply: either the structured object or a plain workout string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkoutData {
    Structured(Box<WorkoutResponse>),
    Legacy(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timing_uses_wire_names() {
        let timing: WorkoutTiming = serde_json::from_value(json!({
            "type": "interval",
            "duration": 20,
            "intervals": { "work": 3, "rest": 1, "rounds": 5 },
            "timeCapMinutes": 25,
            "description": "5 Rounds"
        }))
        .unwrap();

        assert_eq!(timing.kind, TimingKind::Interval);
        assert_eq!(timing.intervals.as_ref().map(|i| i.rounds), Some(5));
        assert_eq!(timing.time_cap_minutes, Some(25.0));
    }

    #[test]
    fn plain_strings_are_legacy_workouts() {
        let data: WorkoutData = serde_json::from_value(json!("AMRAP 20\n10 Burpees")).unwrap();
        assert_eq!(data, WorkoutData::Legacy("AMRAP 20\n10 Burpees".to_string()));
    }

    #[test]
    fn format_names_match_wire_values() {
        for format in WorkoutFormat::ALL {
            let wire = serde_json::to_value(format).unwrap();
            assert_eq!(wire, json!(format.as_str()));
            assert_eq!(WorkoutFormat::from_name(format.as_str()), Some(format));
        }
    }
}
