//! SM-2 review scheduling.
//!
//! Quality grades:
//! - 0: complete blackout
//! - 1: wrong, but recognised once shown
//! - 2: wrong, but the answer felt familiar
//! - 3: right, with serious difficulty
//! - 4: right, after hesitation
//! - 5: right, effortless
//!
//! Grades below 3 reset the repetition streak. The easiness update runs on
//! every answer, pass or fail, and never drops below [`MIN_EASINESS`].

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::SrsError;

pub const INITIAL_EASINESS: f64 = 2.5;
pub const MIN_EASINESS: f64 = 1.3;
pub const MAX_QUALITY: u8 = 5;

const PASSING_QUALITY: u8 = 3;
const FIRST_INTERVAL_DAYS: u32 = 1;
const SECOND_INTERVAL_DAYS: u32 = 6;

// =============================================================================
// QUALITY
// =============================================================================

/// A recall grade in `0..=5`.
///
/// The update formula only behaves for that range, so a `Quality` can only be
/// built through [`Quality::new`] (rejects) or [`Quality::clamped`]
/// (saturates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// # Errors
    ///
    /// Returns [`SrsError::QualityOutOfRange`] unless `0 <= value <= 5`.
    pub fn new(value: i64) -> Result<Self, SrsError> {
        match u8::try_from(value) {
            Ok(grade) if grade <= MAX_QUALITY => Ok(Self(grade)),
            _ => Err(SrsError::QualityOutOfRange(value)),
        }
    }

    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let grade = value.clamp(0, i64::from(MAX_QUALITY));
        Self(u8::try_from(grade).unwrap_or(MAX_QUALITY))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether the grade counts as a successful recall.
    #[must_use]
    pub fn is_pass(self) -> bool {
        self.0 >= PASSING_QUALITY
    }
}

impl TryFrom<i64> for Quality {
    type Error = SrsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// The four answer buttons offered after a card is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Again,
    Hard,
    Good,
    Easy,
}

impl Answer {
    pub const ALL: [Self; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }

    #[must_use]
    pub fn quality(self) -> Quality {
        match self {
            Self::Again => Quality(1),
            Self::Hard => Quality(3),
            Self::Good => Quality(4),
            Self::Easy => Quality(5),
        }
    }
}

// =============================================================================
// REVIEW STATE
// =============================================================================

/// Memory-strength parameters of one card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Interval growth factor, never below [`MIN_EASINESS`].
    pub easiness: f64,
    /// Days until the next review.
    pub interval: u32,
    /// Consecutive successful recalls.
    pub repetitions: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub next_review: OffsetDateTime,
}

impl ReviewState {
    /// State of a freshly authored card: due immediately.
    #[must_use]
    pub fn new(now: OffsetDateTime) -> Self {
        Self { easiness: INITIAL_EASINESS, interval: 0, repetitions: 0, next_review: now }
    }

    #[must_use]
    pub fn is_due(&self, now: OffsetDateTime) -> bool {
        self.next_review <= now
    }
}

// =============================================================================
// SCHEDULER
// =============================================================================

/// Compute the state after answering a card with `quality` at `now`.
///
/// Returns a new state; the input is left untouched.
#[must_use]
pub fn schedule(state: &ReviewState, quality: Quality, now: OffsetDateTime) -> ReviewState {
    let (interval, repetitions) = if quality.is_pass() {
        let interval = match state.repetitions {
            0 => FIRST_INTERVAL_DAYS,
            1 => SECOND_INTERVAL_DAYS,
            _ => grow_interval(state.interval, state.easiness),
        };
        (interval, state.repetitions.saturating_add(1))
    } else {
        (FIRST_INTERVAL_DAYS, 0)
    };

    ReviewState {
        easiness: next_easiness(state.easiness, quality),
        interval,
        repetitions,
        next_review: days_after(now, interval),
    }
}

fn next_easiness(easiness: f64, quality: Quality) -> f64 {
    let miss = f64::from(MAX_QUALITY - quality.value());
    (easiness + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASINESS)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn grow_interval(interval: u32, easiness: f64) -> u32 {
    // `as` saturates; the floor keeps a corrupt zero interval from sticking.
    ((f64::from(interval) * easiness).round() as u32).max(FIRST_INTERVAL_DAYS)
}

fn days_after(now: OffsetDateTime, days: u32) -> OffsetDateTime {
    now.checked_add(Duration::days(i64::from(days)))
        .unwrap_or_else(|| Date::MAX.midnight().assume_offset(now.offset()))
}

/// Interval each answer button would produce, in [`Answer::ALL`] order.
#[must_use]
pub fn preview_intervals(state: &ReviewState) -> [u32; 4] {
    Answer::ALL.map(|answer| schedule(state, answer.quality(), state.next_review).interval)
}

/// Compact label for an interval in days (`now`, `3d`, `2w`, `3mo`, `1y`).
#[must_use]
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{days}d"),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
