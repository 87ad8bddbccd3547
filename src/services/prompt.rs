//! Prompt assembly for workout generation

use super::generator::GenerateRequest;

/// Build the user prompt sent to the model
pub fn build_prompt(request: &GenerateRequest) -> String {
    let format = request.effective_format();
    let movements = if request.random || request.exercises.is_empty() {
        "any movements you choose".to_string()
    } else {
        request.exercises.join(", ")
    };

    let mut prompt = format!(
        "Create a CrossFit-style {} workout using {}.\n",
        format.as_str().replace('_', " "),
        movements
    );

    if let Some(mode) = &request.movement_usage_mode {
        prompt.push_str(&format!("Movement usage: {}.\n", mode));
    }
    if let Some(unit) = &request.weight_unit {
        prompt.push_str(&format!("Give loads in {}.\n", unit));
    }
    match (request.workout_length.as_deref(), request.custom_minutes) {
        (Some("custom"), Some(minutes)) => {
            prompt.push_str(&format!("Total length: about {} minutes.\n", minutes));
        }
        (Some(length), _) => prompt.push_str(&format!("Workout length: {}.\n", length)),
        _ => {}
    }
    if let Some(intent) = &request.workout_intent {
        prompt.push_str(&format!("Training intent: {}.\n", intent));
    }

    prompt.push_str(
        "Reply with a JSON object with keys \"workout\" {text, format, difficulty}, \
         \"timing\" {type, duration, intervals?, timeCapMinutes?, description} and \
         \"metadata\" {movements, estimatedCalories?, equipment?, scalingOptions?}. \
         For EMOM workouts number each minute as \"1. movement\".",
    );

    prompt
}
