//! Workout generation with fallback
//!
//! Asks a [`WorkoutGenerator`] for a workout and turns whatever comes back
//! into a [`WorkoutResponse`]: structured replies are validated (and
//! repaired if needed), plain-text replies get their timing parsed from the
//! text, and failures fall back to the default workout for the format.

use chrono::Utc;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::llm::{extract_json, LlmError};
use crate::workout::{
    default_response, parse_workout_timing, repair_response, timing_confidence, validate_response,
    Difficulty, TimingSource, WorkoutContent, WorkoutFormat, WorkoutMetadata, WorkoutResponse,
    WorkoutSystemInfo, WorkoutTiming, SCHEMA_VERSION,
};

/// Confidence assigned to timing parsed out of plain text
const LEGACY_CONFIDENCE: f64 = 0.6;

const FALLBACK_TEXT: &str = "Error generating workout - using default";

/// Source of raw workout replies
pub trait WorkoutGenerator: Send + Sync {
    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> BoxFuture<'a, Result<String, LlmError>>;
}

/// Options chosen by the user for a new workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Let the model pick movements
    #[serde(default)]
    pub random: bool,
    #[serde(default)]
    pub exercises: Vec<String>,
    /// `random` or `specific`
    #[serde(default)]
    pub format_type: Option<String>,
    #[serde(default = "default_format")]
    pub workout_format: WorkoutFormat,
    #[serde(default)]
    pub weight_unit: Option<String>,
    #[serde(default)]
    pub workout_length: Option<String>,
    #[serde(default)]
    pub custom_minutes: Option<u32>,
    #[serde(default)]
    pub workout_intent: Option<String>,
    #[serde(default)]
    pub movement_usage_mode: Option<String>,
}

fn default_format() -> WorkoutFormat {
    WorkoutFormat::Amrap
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            random: false,
            exercises: Vec::new(),
            format_type: None,
            workout_format: default_format(),
            weight_unit: None,
            workout_length: None,
            custom_minutes: None,
            workout_intent: None,
            movement_usage_mode: None,
        }
    }
}

impl GenerateRequest {
    /// Random format requests are generated as AMRAPs
    pub fn effective_format(&self) -> WorkoutFormat {
        match self.format_type.as_deref() {
            Some("random") => WorkoutFormat::Amrap,
            _ => self.workout_format,
        }
    }
}

/// Result of a generation attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWorkout {
    #[serde(flatten)]
    pub workout: WorkoutResponse,
    /// Set when the default workout was used because generation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Structured reply as the model writes it; `system` is filled in here
#[derive(Debug, Deserialize)]
struct StructuredReply {
    workout: WorkoutContent,
    timing: WorkoutTiming,
    metadata: WorkoutMetadata,
}

/// Generate a workout, falling back to the format default on any failure
pub async fn generate_workout(
    generator: &dyn WorkoutGenerator,
    request: &GenerateRequest,
) -> GeneratedWorkout {
    let format = request.effective_format();
    info!("Generating {} workout ({} movements selected)", format, request.exercises.len());

    let result = match generator.generate(request).await {
        Ok(reply) => interpret_reply(&reply, format),
        Err(e) => Err(e),
    };

    match result {
        Ok(workout) => {
            info!(
                "Workout ready: source={:?}, confidence={:.2}",
                workout.system.source, workout.system.confidence
            );
            GeneratedWorkout {
                workout,
                error: None,
            }
        }
        Err(e) => {
            warn!("Workout generation failed, using default {} workout: {}", format, e);
            GeneratedWorkout {
                workout: default_response(format, Some(FALLBACK_TEXT)),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Turn a raw model reply into a workout
pub fn interpret_reply(reply: &str, format: WorkoutFormat) -> Result<WorkoutResponse, LlmError> {
    let parsed = extract_json(reply).and_then(|json| serde_json::from_str::<Value>(json).ok());

    match parsed {
        Some(value) if value.get("workout").is_some() => structured_workout(value, format),
        // Some deployments wrap the plain text in a JSON string
        _ => match serde_json::from_str::<Value>(reply.trim()) {
            Ok(Value::String(text)) => legacy_workout(&text, format),
            _ => legacy_workout(reply, format),
        },
    }
}

fn structured_workout(value: Value, format: WorkoutFormat) -> Result<WorkoutResponse, LlmError> {
    if let Ok(reply) = serde_json::from_value::<StructuredReply>(value.clone()) {
        let confidence = timing_confidence(&reply.timing, reply.workout.format, TimingSource::Ai);
        let response = WorkoutResponse {
            workout: reply.workout,
            timing: reply.timing,
            metadata: reply.metadata,
            system: WorkoutSystemInfo {
                generated: Utc::now(),
                version: SCHEMA_VERSION.to_string(),
                source: TimingSource::Ai,
                confidence,
            },
        };
        match validate_response(&response) {
            Ok(()) => return Ok(response),
            Err(errors) => warn!("Structured workout failed validation: {}", errors.join("; ")),
        }
    }

    repair_response(&value, format)
        .ok_or_else(|| LlmError::Parse("structured workout could not be repaired".to_string()))
}

fn legacy_workout(text: &str, format: WorkoutFormat) -> Result<WorkoutResponse, LlmError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyReply);
    }

    let timing = parse_workout_timing(text, format).into_timing();
    info!("Parsed legacy workout timing: {}", timing.description);

    Ok(WorkoutResponse {
        workout: WorkoutContent {
            text: text.to_string(),
            format,
            difficulty: Difficulty::Intermediate,
        },
        timing,
        metadata: WorkoutMetadata {
            movements: vec!["unknown".to_string()],
            ..WorkoutMetadata::default()
        },
        system: WorkoutSystemInfo {
            generated: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
            source: TimingSource::Parsed,
            confidence: LEGACY_CONFIDENCE,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::TimingKind;
    use serde_json::json;

    struct CannedGenerator(Result<String, LlmError>);

    impl WorkoutGenerator for CannedGenerator {
        fn generate<'a>(&'a self, _request: &'a GenerateRequest) -> BoxFuture<'a, Result<String, LlmError>> {
            let reply = self.0.clone();
            Box::pin(async move { reply })
        }
    }

    fn emom_request() -> GenerateRequest {
        GenerateRequest {
            workout_format: WorkoutFormat::Emom,
            ..GenerateRequest::default()
        }
    }

    fn structured_emom() -> Value {
        json!({
            "workout": {
                "text": "12-Minute EMOM\n1. 12 Burpees\n2. 15 Box Jumps",
                "format": "emom",
                "difficulty": "advanced"
            },
            "timing": {
                "type": "interval",
                "duration": 12,
                "intervals": { "work": 1, "rest": 0, "rounds": 12 },
                "description": "12-Minute EMOM"
            },
            "metadata": { "movements": ["Burpees", "Box Jumps"] }
        })
    }

    #[tokio::test]
    async fn structured_reply_is_trusted() {
        let reply = format!("```json\n{}\n```", structured_emom());
        let generator = CannedGenerator(Ok(reply));

        let generated = generate_workout(&generator, &emom_request()).await;
        assert_eq!(generated.error, None);
        assert_eq!(generated.workout.system.source, TimingSource::Ai);
        assert_eq!(generated.workout.system.confidence, 1.0);
        assert_eq!(generated.workout.workout.difficulty, Difficulty::Advanced);
    }

    #[tokio::test]
    async fn mismatched_timing_is_repaired() {
        let mut reply = structured_emom();
        reply["timing"] = json!({ "type": "interval", "duration": 500, "description": "way too long" });
        let generator = CannedGenerator(Ok(reply.to_string()));

        let generated = generate_workout(&generator, &emom_request()).await;
        assert_eq!(generated.workout.system.source, TimingSource::Parsed);
        assert_eq!(generated.workout.timing.description, "15-Minute EMOM");
        assert_eq!(generated.error, None);
    }

    #[tokio::test]
    async fn plain_text_reply_gets_parsed_timing() {
        let generator = CannedGenerator(Ok("\"EMOM 14\\n1. 10 Thrusters\"".to_string()));

        let generated = generate_workout(&generator, &emom_request()).await;
        let workout = generated.workout;
        assert_eq!(workout.workout.text, "EMOM 14\n1. 10 Thrusters");
        assert_eq!(workout.timing.kind, TimingKind::Interval);
        assert_eq!(workout.timing.duration, 14.0);
        assert_eq!(workout.system.confidence, LEGACY_CONFIDENCE);
    }

    #[tokio::test]
    async fn generator_errors_fall_back_to_default() {
        let generator = CannedGenerator(Err(LlmError::Api("quota exceeded".to_string())));

        let generated = generate_workout(&generator, &emom_request()).await;
        assert_eq!(generated.error.as_deref(), Some("API error: quota exceeded"));
        assert_eq!(generated.workout.system.source, TimingSource::Default);
        assert_eq!(generated.workout.workout.text, FALLBACK_TEXT);
        assert_eq!(generated.workout.workout.format, WorkoutFormat::Emom);
    }

    #[tokio::test]
    async fn empty_reply_falls_back() {
        let generator = CannedGenerator(Ok("   ".to_string()));
        let generated = generate_workout(&generator, &GenerateRequest::default()).await;
        assert_eq!(generated.error.as_deref(), Some("Model returned an empty workout"));
        assert_eq!(generated.workout.workout.format, WorkoutFormat::Amrap);
    }

    #[test]
    fn random_format_becomes_amrap() {
        let request = GenerateRequest {
            format_type: Some("random".to_string()),
            workout_format: WorkoutFormat::Chipper,
            ..GenerateRequest::default()
        };
        assert_eq!(request.effective_format(), WorkoutFormat::Amrap);
    }
}
