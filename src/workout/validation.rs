//! Validation, repair and defaults for generated workouts

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{
    Difficulty, TimingKind, TimingSource, WorkoutContent, WorkoutFormat, WorkoutIntervals,
    WorkoutMetadata, WorkoutResponse, WorkoutSystemInfo, WorkoutTiming, SCHEMA_VERSION,
};

const MIN_TEXT_LEN: usize = 10;
const MIN_DESCRIPTION_LEN: usize = 5;
const MAX_DURATION_MINUTES: f64 = 120.0;
const MAX_MOVEMENTS: usize = 20;
const MAX_EQUIPMENT: usize = 15;
const MAX_SCALING_OPTIONS: usize = 10;

/// Check every section of a workout and that its timing fits its format
pub fn validate_response(response: &WorkoutResponse) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if response.workout.text.chars().count() < MIN_TEXT_LEN {
        errors.push(format!("Workout text must be at least {} characters", MIN_TEXT_LEN));
    }
    errors.extend(validate_timing(&response.timing));
    errors.extend(validate_metadata(&response.metadata));

    if !timing_matches_format(&response.timing, response.workout.format) {
        errors.push(format!(
            "Timing type {:?} does not fit format {}",
            response.timing.kind, response.workout.format
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Range checks for a timing block
pub fn validate_timing(timing: &WorkoutTiming) -> Vec<String> {
    let mut errors = Vec::new();

    if !(0.0..=MAX_DURATION_MINUTES).contains(&timing.duration) {
        errors.push("Duration must be between 0 and 120 minutes".to_string());
    }
    if timing.description.chars().count() < MIN_DESCRIPTION_LEN {
        errors.push("Timing description is too short".to_string());
    }
    if let Some(intervals) = &timing.intervals {
        errors.extend(validate_intervals(intervals));
    }
    if let Some(cap) = timing.time_cap_minutes {
        if !(1.0..=MAX_DURATION_MINUTES).contains(&cap) {
            errors.push("Time cap must be between 1 and 120 minutes".to_string());
        }
    }

    errors
}

fn validate_intervals(intervals: &WorkoutIntervals) -> Vec<String> {
    let mut errors = Vec::new();

    if !(0.25..=30.0).contains(&intervals.work) {
        errors.push("Work period must be between 0.25 and 30 minutes".to_string());
    }
    if !(0.0..=30.0).contains(&intervals.rest) {
        errors.push("Rest period must be between 0 and 30 minutes".to_string());
    }
    if !(1..=50).contains(&intervals.rounds) {
        errors.push("Rounds must be between 1 and 50".to_string());
    }

    errors
}

/// Range checks for workout metadata
pub fn validate_metadata(metadata: &WorkoutMetadata) -> Vec<String> {
    let mut errors = Vec::new();

    if metadata.movements.is_empty() || metadata.movements.len() > MAX_MOVEMENTS {
        errors.push(format!("Workout must list between 1 and {} movements", MAX_MOVEMENTS));
    }
    if let Some(calories) = metadata.estimated_calories {
        if !(50.0..=2000.0).contains(&calories) {
            errors.push("Estimated calories must be between 50 and 2000".to_string());
        }
    }
    if metadata.equipment.as_ref().is_some_and(|e| e.len() > MAX_EQUIPMENT) {
        errors.push(format!("At most {} equipment items", MAX_EQUIPMENT));
    }
    if metadata
        .scaling_options
        .as_ref()
        .is_some_and(|s| s.len() > MAX_SCALING_OPTIONS)
    {
        errors.push(format!("At most {} scaling options", MAX_SCALING_OPTIONS));
    }

    errors
}

/// Whether a timing block makes sense for a workout format
pub fn timing_matches_format(timing: &WorkoutTiming, format: WorkoutFormat) -> bool {
    match format {
        WorkoutFormat::Amrap => {
            timing.kind == TimingKind::Countdown && timing.duration > 0.0 && timing.duration <= 60.0
        }
        WorkoutFormat::Emom => {
            timing.kind == TimingKind::Interval
                && timing.duration > 0.0
                && timing
                    .intervals
                    .as_ref()
                    .is_some_and(|i| i.work == 1.0 && i.rest == 0.0)
        }
        WorkoutFormat::Intervals => {
            timing.kind == TimingKind::Interval
                && timing
                    .intervals
                    .as_ref()
                    .is_some_and(|i| i.work > 0.0 && i.rounds > 0)
        }
        WorkoutFormat::ForTime | WorkoutFormat::Chipper => timing.kind == TimingKind::Countup,
        WorkoutFormat::StrengthMetcon => {
            matches!(timing.kind, TimingKind::Countdown | TimingKind::None)
        }
    }
}

/// Confidence score (0-1) for a timing block
pub fn timing_confidence(timing: &WorkoutTiming, format: WorkoutFormat, source: TimingSource) -> f64 {
    let mut confidence: f64 = match source {
        TimingSource::Ai => 0.9,
        TimingSource::Parsed => 0.7,
        TimingSource::Default => 0.5,
    };

    if timing_matches_format(timing, format) {
        confidence += 0.1;
    }
    if timing.duration > 0.0 && timing.duration <= 60.0 {
        confidence += 0.05;
    }
    if timing.description.chars().count() > 5 {
        confidence += 0.05;
    }

    confidence.min(1.0)
}

/// Built-in timing for each format
pub fn default_timing(format: WorkoutFormat) -> WorkoutTiming {
    let timing = |kind, duration, description: &str| WorkoutTiming {
        kind,
        duration,
        intervals: None,
        time_cap_minutes: None,
        description: description.to_string(),
    };

    match format {
        WorkoutFormat::Amrap => timing(TimingKind::Countdown, 20.0, "20-Minute AMRAP"),
        WorkoutFormat::Emom => WorkoutTiming {
            intervals: Some(WorkoutIntervals {
                work: 1.0,
                rest: 0.0,
                rounds: 15,
            }),
            ..timing(TimingKind::Interval, 15.0, "15-Minute EMOM")
        },
        WorkoutFormat::ForTime => WorkoutTiming {
            time_cap_minutes: Some(15.0),
            ..timing(TimingKind::Countup, 0.0, "For Time (15 min cap)")
        },
        WorkoutFormat::Intervals => WorkoutTiming {
            intervals: Some(WorkoutIntervals {
                work: 3.0,
                rest: 1.0,
                rounds: 5,
            }),
            ..timing(TimingKind::Interval, 20.0, "5 Rounds (3 min work, 1 min rest)")
        },
        WorkoutFormat::Chipper => WorkoutTiming {
            time_cap_minutes: Some(25.0),
            ..timing(TimingKind::Countup, 0.0, "Chipper For Time (25 min cap)")
        },
        WorkoutFormat::StrengthMetcon => timing(TimingKind::Countdown, 15.0, "15-Minute MetCon"),
    }
}

/// Placeholder workout used when generation fails
pub fn default_response(format: WorkoutFormat, text: Option<&str>) -> WorkoutResponse {
    let timing = default_timing(format);
    let confidence = timing_confidence(&timing, format, TimingSource::Default);

    WorkoutResponse {
        workout: WorkoutContent {
            text: text.unwrap_or("Default workout - please regenerate").to_string(),
            format,
            difficulty: Difficulty::Intermediate,
        },
        timing,
        metadata: WorkoutMetadata {
            movements: vec!["unknown".to_string()],
            equipment: Some(vec!["basic".to_string()]),
            ..WorkoutMetadata::default()
        },
        system: WorkoutSystemInfo {
            generated: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
            source: TimingSource::Default,
            confidence,
        },
    }
}

/// Salvage what is usable from a malformed structured reply.
///
/// Invalid sections are replaced with defaults for `format`. Returns `None`
/// when the result still fails validation.
pub fn repair_response(data: &Value, format: WorkoutFormat) -> Option<WorkoutResponse> {
    let object = data.as_object()?;
    let workout = object.get("workout");
    let metadata = object.get("metadata");

    let content = WorkoutContent {
        text: workout
            .and_then(|w| w.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("Workout unavailable")
            .to_string(),
        format: workout
            .and_then(|w| w.get("format"))
            .and_then(Value::as_str)
            .and_then(WorkoutFormat::from_name)
            .unwrap_or(format),
        difficulty: workout
            .and_then(|w| w.get("difficulty"))
            .and_then(Value::as_str)
            .and_then(Difficulty::from_name)
            .unwrap_or_default(),
    };

    let timing = object
        .get("timing")
        .cloned()
        .and_then(|t| serde_json::from_value::<WorkoutTiming>(t).ok())
        .filter(|t| validate_timing(t).is_empty())
        .unwrap_or_else(|| {
            debug!("Replacing unusable timing with {} default", format);
            default_timing(format)
        });

    let metadata = WorkoutMetadata {
        movements: string_list(metadata, "movements").unwrap_or_else(|| vec!["unknown".to_string()]),
        estimated_calories: metadata
            .and_then(|m| m.get("estimatedCalories"))
            .and_then(Value::as_f64),
        equipment: string_list(metadata, "equipment"),
        scaling_options: string_list(metadata, "scalingOptions"),
    };

    let repaired = WorkoutResponse {
        system: WorkoutSystemInfo {
            generated: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
            source: TimingSource::Parsed,
            confidence: timing_confidence(&timing, format, TimingSource::Parsed),
        },
        workout: content,
        timing,
        metadata,
    };

    match validate_response(&repaired) {
        Ok(()) => Some(repaired),
        Err(errors) => {
            warn!("Workout repair failed: {}", errors.join("; "));
            None
        }
    }
}

fn string_list(section: Option<&Value>, key: &str) -> Option<Vec<String>> {
    section
        .and_then(|s| s.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
}
