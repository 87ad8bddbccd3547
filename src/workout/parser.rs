//! Timing extraction from plain-text workouts
//!
//! Legacy generator replies are just the workout text. This module looks
//! for phrases such as "20-minute AMRAP", "EMOM 15", "every 3 minutes for
//! 18 minutes" or "15 minute time cap" and falls back to the format default
//! when nothing matches.

use super::types::{TimingKind, WorkoutFormat, WorkoutIntervals, WorkoutTiming};
use crate::timer::TimerKind;

/// Timing recovered from workout text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTiming {
    pub minutes: u32,
    pub kind: TimerKind,
    pub interval_minutes: Option<u32>,
    pub description: String,
}

impl ParsedTiming {
    fn new(minutes: u32, kind: TimerKind, description: impl Into<String>) -> Self {
        Self {
            minutes,
            kind,
            interval_minutes: None,
            description: description.into(),
        }
    }

    fn interval(minutes: u32, interval_minutes: u32, description: impl Into<String>) -> Self {
        Self {
            interval_minutes: Some(interval_minutes),
            ..Self::new(minutes, TimerKind::Interval, description)
        }
    }

    /// Default timing for a format when the text gives no hint
    pub fn default_for(format: WorkoutFormat) -> Self {
        match format {
            WorkoutFormat::Amrap => Self::new(20, TimerKind::Countdown, "20-Minute AMRAP"),
            WorkoutFormat::Emom => Self::interval(15, 1, "15-Minute EMOM"),
            WorkoutFormat::ForTime => Self::new(0, TimerKind::Countup, "For Time"),
            WorkoutFormat::Intervals => Self::interval(20, 2, "20-Minute Intervals"),
            WorkoutFormat::Chipper => Self::new(0, TimerKind::Countup, "Chipper For Time"),
            WorkoutFormat::StrengthMetcon => Self::new(15, TimerKind::Countdown, "15-Minute MetCon"),
        }
    }

    /// Convert into the timing block used by structured workouts
    pub fn into_timing(self) -> WorkoutTiming {
        let kind = match self.kind {
            TimerKind::Countdown => TimingKind::Countdown,
            TimerKind::Countup => TimingKind::Countup,
            TimerKind::Interval => TimingKind::Interval,
        };
        let intervals = self.interval_minutes.filter(|m| *m > 0).map(|work| WorkoutIntervals {
            work: f64::from(work),
            rest: 0.0,
            rounds: self.minutes.div_ceil(work),
        });

        WorkoutTiming {
            kind,
            duration: f64::from(self.minutes),
            intervals,
            time_cap_minutes: None,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pat {
    Word(&'static str),
    /// Any of min, mins, minute, minutes
    Min,
    Num,
}

use Pat::{Min, Num, Word};

const AMRAP: &[&[Pat]] = &[&[Num, Min, Word("amrap")], &[Word("amrap"), Num]];

const EMOM: &[&[Pat]] = &[
    &[Num, Min, Word("emom")],
    &[Word("emom"), Num],
    &[Word("every"), Word("minute"), Word("for"), Num, Min],
];

const TIME_CAP: &[&[Pat]] = &[
    &[Num, Min, Word("time"), Word("cap")],
    &[Word("time"), Word("cap"), Num, Min],
];

const INTERVALS: &[&[Pat]] = &[
    &[Word("every"), Num, Min, Word("for"), Num, Min],
    &[Num, Word("rounds"), Word("every"), Num, Min],
];

const GENERAL: &[&[Pat]] = &[
    &[Word("in"), Num, Min],
    &[Num, Min, Word("to"), Word("complete")],
];

/// Extract timing from workout text, falling back to the format default
pub fn parse_workout_timing(text: &str, format: WorkoutFormat) -> ParsedTiming {
    let lowered = text.to_lowercase();
    let tokens = tokenize(&lowered);

    let extracted = match format {
        WorkoutFormat::Amrap => find(&tokens, AMRAP)
            .and_then(|(_, n)| positive(n[0]))
            .map(|m| ParsedTiming::new(m, TimerKind::Countdown, format!("{}-Minute AMRAP", m))),
        WorkoutFormat::Emom => find(&tokens, EMOM)
            .and_then(|(_, n)| positive(n[0]))
            .map(|m| ParsedTiming::interval(m, 1, format!("{}-Minute EMOM", m))),
        WorkoutFormat::Intervals => find(&tokens, INTERVALS).and_then(|(alt, n)| {
            if alt == 0 {
                let (every, total) = (positive(n[0])?, positive(n[1])?);
                Some(ParsedTiming::interval(
                    total,
                    every,
                    format!("{}-Minute Intervals (Every {} min)", total, every),
                ))
            } else {
                let (rounds, every) = (positive(n[0])?, positive(n[1])?);
                Some(ParsedTiming::interval(
                    rounds.saturating_mul(every),
                    every,
                    format!("{} Rounds Every {} Minutes", rounds, every),
                ))
            }
        }),
        _ => None,
    };

    let extracted = extracted.or_else(|| match format {
        WorkoutFormat::ForTime | WorkoutFormat::Chipper => find(&tokens, TIME_CAP)
            .and_then(|(_, n)| positive(n[0]))
            .map(|m| ParsedTiming::new(m, TimerKind::Countdown, format!("{}-Minute Time Cap", m))),
        _ => None,
    });

    let extracted = extracted.or_else(|| {
        let minutes = find(&tokens, GENERAL).and_then(|(_, n)| positive(n[0]))?;
        Some(match format {
            WorkoutFormat::ForTime | WorkoutFormat::Chipper => {
                ParsedTiming::new(minutes, TimerKind::Countup, format!("{}-Minute Time Cap", minutes))
            }
            _ => ParsedTiming::new(minutes, TimerKind::Countdown, format!("{}-Minute Timer", minutes)),
        })
    });

    extracted.unwrap_or_else(|| ParsedTiming::default_for(format))
}

fn positive(n: u32) -> Option<u32> {
    (n > 0).then_some(n)
}

/// Split into runs of ASCII digits and runs of letters, dropping the rest
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<(usize, bool)> = None;

    for (i, c) in text.char_indices() {
        let class = if c.is_ascii_digit() {
            Some(true)
        } else if c.is_alphabetic() {
            Some(false)
        } else {
            None
        };

        match (start, class) {
            (Some((_, digits)), Some(is_digit)) if digits == is_digit => {}
            (Some((s, _)), _) => {
                tokens.push(&text[s..i]);
                start = class.map(|is_digit| (i, is_digit));
            }
            (None, _) => start = class.map(|is_digit| (i, is_digit)),
        }
    }
    if let Some((s, _)) = start {
        tokens.push(&text[s..]);
    }

    tokens
}

/// First position where any alternative matches, with its captured numbers
fn find(tokens: &[&str], alternatives: &[&[Pat]]) -> Option<(usize, Vec<u32>)> {
    (0..tokens.len()).find_map(|start| {
        alternatives
            .iter()
            .enumerate()
            .find_map(|(alt, pattern)| match_at(&tokens[start..], pattern).map(|n| (alt, n)))
    })
}

fn match_at(tokens: &[&str], pattern: &[Pat]) -> Option<Vec<u32>> {
    if tokens.len() < pattern.len() {
        return None;
    }

    let mut numbers = Vec::new();
    for (token, pat) in tokens.iter().zip(pattern) {
        match pat {
            Word(word) if token == word => {}
            Min if matches!(*token, "min" | "mins" | "minute" | "minutes") => {}
            Num => numbers.push(token.parse().ok()?),
            _ => return None,
        }
    }
    Some(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_amrap_length_either_way() {
        let parsed = parse_workout_timing("20-Minute AMRAP:\n10 Burpees", WorkoutFormat::Amrap);
        assert_eq!(parsed, ParsedTiming::new(20, TimerKind::Countdown, "20-Minute AMRAP"));

        let parsed = parse_workout_timing("AMRAP 12\n5 Pull-ups", WorkoutFormat::Amrap);
        assert_eq!(parsed.minutes, 12);
    }

    #[test]
    fn finds_emom_length() {
        let parsed = parse_workout_timing("Every minute for 18 minutes:", WorkoutFormat::Emom);
        assert_eq!(parsed.minutes, 18);
        assert_eq!(parsed.kind, TimerKind::Interval);
        assert_eq!(parsed.interval_minutes, Some(1));

        assert_eq!(parse_workout_timing("10min EMOM", WorkoutFormat::Emom).minutes, 10);
    }

    #[test]
    fn finds_interval_cadence() {
        let parsed = parse_workout_timing("Every 3 minutes for 18 minutes", WorkoutFormat::Intervals);
        assert_eq!(parsed.minutes, 18);
        assert_eq!(parsed.interval_minutes, Some(3));

        let parsed = parse_workout_timing("5 rounds every 4 min", WorkoutFormat::Intervals);
        assert_eq!(parsed.minutes, 20);
        assert_eq!(parsed.interval_minutes, Some(4));
        assert_eq!(parsed.description, "5 Rounds Every 4 Minutes");
    }

    #[test]
    fn for_time_uses_time_cap_as_countdown() {
        let parsed = parse_workout_timing("For time (Time cap: 15 min)", WorkoutFormat::ForTime);
        assert_eq!(parsed, ParsedTiming::new(15, TimerKind::Countdown, "15-Minute Time Cap"));
    }

    #[test]
    fn general_minutes_as_fallback() {
        let parsed = parse_workout_timing("Complete in 25 minutes", WorkoutFormat::Chipper);
        assert_eq!(parsed.kind, TimerKind::Countup);
        assert_eq!(parsed.minutes, 25);

        let parsed = parse_workout_timing("12 minutes to complete", WorkoutFormat::StrengthMetcon);
        assert_eq!(parsed.kind, TimerKind::Countdown);
        assert_eq!(parsed.description, "12-Minute Timer");
    }

    #[test]
    fn unmatched_text_gets_format_default() {
        for format in WorkoutFormat::ALL {
            assert_eq!(
                parse_workout_timing("Just lift heavy things", format),
                ParsedTiming::default_for(format)
            );
        }
        assert_eq!(parse_workout_timing("AMRAP 0", WorkoutFormat::Amrap).minutes, 20);
    }

    #[test]
    fn interval_timing_converts_to_rounds() {
        let timing = ParsedTiming::interval(20, 3, "Intervals").into_timing();
        assert_eq!(timing.kind, TimingKind::Interval);
        assert_eq!(timing.intervals.map(|i| i.rounds), Some(7));
    }
}
