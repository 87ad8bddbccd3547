//! External service integration
//!
//! This module contains the workout generation pipeline and the LLM client
//! it talks to.

pub mod generator;
pub mod llm;
pub mod prompt;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;

// Re-export main types
pub use generator::{generate_workout, GenerateRequest, GeneratedWorkout, WorkoutGenerator};
pub use llm::{AzureOpenAiGenerator, LlmError, UnconfiguredGenerator};

/// Pick the workout generator for this configuration
pub fn generator_from_config(config: &Config) -> Arc<dyn WorkoutGenerator> {
    match config.llm_settings() {
        Some(settings) => {
            info!("Workout generation via {} ({})", settings.endpoint, settings.model);
            Arc::new(AzureOpenAiGenerator::new(settings))
        }
        None => {
            warn!("OPEN_AI_TARGET_URI or OPEN_AI_TARGET_KEY not set, serving default workouts only");
            Arc::new(UnconfiguredGenerator)
        }
    }
}
