//! Movement cues for interval timers
//!
//! Turns the displayed workout text into a list of labels indexed by round
//! (EMOM) or set (multi-minute intervals). Parsing is a best-effort
//! heuristic: text that does not match simply yields an empty schedule.

use super::config::{TimerConfig, TimerKind};

/// Numbered lines beyond this are ignored
const MAX_SLOTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScheduleMode {
    PerMinute,
    MultiMinute,
}

/// Labels for each interval of a workout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementSchedule {
    mode: ScheduleMode,
    slots: Vec<Option<String>>,
}

impl MovementSchedule {
    pub fn empty() -> Self {
        Self {
            mode: ScheduleMode::PerMinute,
            slots: Vec::new(),
        }
    }

    /// Build the schedule for `config` from raw workout text
    pub fn parse(workout_text: &str, config: &TimerConfig) -> Self {
        if config.kind() != TimerKind::Interval || workout_text.trim().is_empty() {
            return Self::empty();
        }

        if config.is_per_minute() {
            Self {
                mode: ScheduleMode::PerMinute,
                slots: numbered_slots(workout_text),
            }
        } else {
            // One shared label; every set falls back to it on lookup
            let combined = combined_label(workout_text);
            let slots = if combined.is_empty() {
                Vec::new()
            } else {
                vec![Some(combined)]
            };
            Self {
                mode: ScheduleMode::MultiMinute,
                slots,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Label for a 1-indexed interval, or `""` when there is no cue
    pub fn label_for(&self, interval: u32) -> &str {
        if self.slots.is_empty() {
            return "";
        }

        let index = (interval as usize).checked_sub(1);
        let slot = match self.mode {
            // Labels repeat when fewer were parsed than there are minutes
            ScheduleMode::PerMinute => index.map(|i| &self.slots[i % self.slots.len()]),
            ScheduleMode::MultiMinute => index
                .and_then(|i| self.slots.get(i))
                .filter(|slot| slot.is_some())
                .or_else(|| self.slots.first()),
        };

        slot.and_then(|s| s.as_deref()).unwrap_or("")
    }
}

impl Default for MovementSchedule {
    fn default() -> Self {
        Self::empty()
    }
}

/// Collect `<n>. <label>` lines into slot `n - 1`
fn numbered_slots(text: &str) -> Vec<Option<String>> {
    let mut slots: Vec<Option<String>> = Vec::new();

    for line in text.lines() {
        let Some((number, label)) = numbered_line(line) else {
            continue;
        };
        if number == 0 || number > MAX_SLOTS {
            continue;
        }
        if slots.len() < number {
            slots.resize(number, None);
        }
        slots[number - 1] = Some(label.to_string());
    }

    slots
}

fn numbered_line(line: &str) -> Option<(usize, &str)> {
    let digits_end = line
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)?;
    if digits_end == 0 {
        return None;
    }

    let rest = line[digits_end..].strip_prefix('.')?;
    if rest.is_empty() {
        return None;
    }

    let number = line[..digits_end].parse().ok()?;
    Some((number, rest.trim()))
}

/// Join every non-header line into a single label
fn combined_label(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_timing_header(line))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_timing_header(line: &str) -> bool {
    let names_unit = line.contains("Set") || line.contains("Minute");
    let names_cadence = line.contains("every") || line.contains("EMOM");
    (names_unit && names_cadence) || line.contains("AMRAP") || line.contains("For Time")
}
