//! Saved workout history, kept in memory per user

use std::{
    collections::HashMap,
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

pub const MAX_NOTES_LENGTH: usize = 500;
pub const MAX_ACTUAL_DURATION_MINUTES: f64 = 600.0;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// A workout a user kept, with their notes and rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWorkout {
    pub id: Uuid,
    pub user_id: String,
    /// The generated workout as the client received it
    pub workout: Value,
    pub saved_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub actual_duration: Option<f64>,
    pub notes: Option<String>,
    pub favorite: bool,
    pub rating: Option<u8>,
}

impl SavedWorkout {
    fn field(&self, name: &str) -> Option<&str> {
        self.workout.get("workout")?.get(name)?.as_str()
    }

    /// When the workout was done, or saved if never marked complete
    pub fn performed_at(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.saved_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWorkoutRequest {
    pub workout: Option<Value>,
    pub completed_at: Option<DateTime<Utc>>,
    pub actual_duration: Option<f64>,
    pub notes: Option<String>,
}

impl SaveWorkoutRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.workout.as_ref().map_or(true, Value::is_null) {
            errors.push("Workout data is required".to_string());
        }
        if let Some(notes) = &self.notes {
            errors.extend(validate_notes(notes));
        }
        if let Some(duration) = self.actual_duration {
            if !(0.0..=MAX_ACTUAL_DURATION_MINUTES).contains(&duration) {
                errors.push("Actual duration must be between 0 and 600 minutes".to_string());
            }
        }

        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkoutRequest {
    pub notes: Option<String>,
    pub favorite: Option<bool>,
    pub rating: Option<u8>,
}

impl UpdateWorkoutRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(notes) = &self.notes {
            errors.extend(validate_notes(notes));
        }
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                errors.push("Rating must be between 1 and 5".to_string());
            }
        }

        errors
    }
}

fn validate_notes(notes: &str) -> Option<String> {
    (notes.chars().count() > MAX_NOTES_LENGTH)
        .then(|| format!("Notes cannot exceed {} characters", MAX_NOTES_LENGTH))
}

/// History query parameters
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilters {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub favorite: Option<bool>,
    pub search: Option<String>,
    /// Comma separated workout formats
    pub formats: Option<String>,
    /// Comma separated difficulties
    pub difficulties: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl HistoryFilters {
    fn matches(&self, saved: &SavedWorkout) -> bool {
        if self.favorite == Some(true) && !saved.favorite {
            return false;
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_text = saved
                .field("text")
                .is_some_and(|text| text.to_lowercase().contains(&needle));
            let in_notes = saved
                .notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains(&needle));
            if !in_text && !in_notes {
                return false;
            }
        }

        if !list_contains(self.formats.as_deref(), saved.field("format")) {
            return false;
        }
        if !list_contains(self.difficulties.as_deref(), saved.field("difficulty")) {
            return false;
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            let performed = saved.performed_at();
            if performed < start || performed > end {
                return false;
            }
        }

        true
    }
}

/// `true` when no list was given, otherwise whether `value` is in it
fn list_contains(list: Option<&str>, value: Option<&str>) -> bool {
    let Some(list) = list.filter(|l| !l.trim().is_empty()) else {
        return true;
    };
    value.is_some_and(|value| list.split(',').any(|item| item.trim() == value))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub workouts: Vec<SavedWorkout>,
    pub total_count: usize,
    pub has_more: bool,
}

/// In-memory saved workouts keyed by user
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Mutex<HashMap<String, Vec<SavedWorkout>>>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a workout for a user. The request must already be validated.
    pub fn save(&self, user_id: &str, request: SaveWorkoutRequest) -> Result<SavedWorkout, String> {
        let now = Utc::now();
        let saved = SavedWorkout {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            workout: request.workout.unwrap_or(Value::Null),
            saved_at: now,
            completed_at: Some(request.completed_at.unwrap_or(now)),
            actual_duration: request.actual_duration,
            notes: request.notes,
            favorite: false,
            rating: None,
        };

        let mut workouts = self.workouts.lock()
            .map_err(|e| format!("Failed to lock workout store: {}", e))?;
        workouts
            .entry(user_id.to_string())
            .or_default()
            .push(saved.clone());

        info!("Saved workout {} for user {}", saved.id, user_id);
        Ok(saved)
    }

    /// Newest-first page of a user's workouts matching `filters`
    pub fn history(&self, user_id: &str, filters: &HistoryFilters) -> Result<HistoryPage, String> {
        let workouts = self.workouts.lock()
            .map_err(|e| format!("Failed to lock workout store: {}", e))?;

        let mut matching: Vec<&SavedWorkout> = workouts
            .get(user_id)
            .map(|list| list.iter().filter(|w| filters.matches(w)).collect())
            .unwrap_or_default();
        matching.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));

        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let offset = filters.offset.unwrap_or(0);
        let total_count = matching.len();

        let page: Vec<SavedWorkout> = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        debug!("History for {}: {} of {} workouts", user_id, page.len(), total_count);

        Ok(HistoryPage {
            workouts: page,
            total_count,
            has_more: offset.saturating_add(limit) < total_count,
        })
    }

    /// Apply notes, favorite and rating changes. `Ok(None)` when the user has
    /// no workout with that id.
    pub fn update(
        &self,
        user_id: &str,
        id: Uuid,
        update: UpdateWorkoutRequest,
    ) -> Result<Option<SavedWorkout>, String> {
        let mut workouts = self.workouts.lock()
            .map_err(|e| format!("Failed to lock workout store: {}", e))?;

        let Some(saved) = workouts
            .get_mut(user_id)
            .and_then(|list| list.iter_mut().find(|w| w.id == id))
        else {
            return Ok(None);
        };

        if let Some(notes) = update.notes {
            saved.notes = Some(notes);
        }
        if let Some(favorite) = update.favorite {
            saved.favorite = favorite;
        }
        if let Some(rating) = update.rating {
            saved.rating = Some(rating);
        }

        info!("Updated workout {} for user {}", id, user_id);
        Ok(Some(saved.clone()))
    }

    /// Remove a workout. Returns whether it existed.
    pub fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, String> {
        let mut workouts = self.workouts.lock()
            .map_err(|e| format!("Failed to lock workout store: {}", e))?;

        let Some(list) = workouts.get_mut(user_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|w| w.id != id);
        let removed = list.len() != before;

        if removed {
            info!("Deleted workout {} for user {}", id, user_id);
        }
        Ok(removed)
    }
}
