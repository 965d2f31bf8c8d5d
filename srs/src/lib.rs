//! Spaced-repetition scheduling for flashcards.
//!
//! This crate owns the review model used by the study dashboard: the SM-2
//! scheduler itself ([`schedule()`]), the card and deck records it runs over,
//! and the study session that walks a queue of due cards. Everything here is
//! pure; persistence and clocks belong to the caller, so every operation that
//! needs "now" takes it as an argument.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`schedule`] | Quality grades, review state, the SM-2 update |
//! | [`card`] | Flashcards, decks, due filtering, study queues |
//! | [`session`] | Answer-by-answer walk through a study queue |

pub mod card;
pub mod schedule;
pub mod session;

pub use card::{Deck, DeckStats, Flashcard, build_study_queue, deck_stats, due_cards, remove_deck_cards};
pub use schedule::{
    Answer, INITIAL_EASINESS, MAX_QUALITY, MIN_EASINESS, Quality, ReviewState, format_interval, preview_intervals,
    schedule,
};
pub use session::StudySession;

/// Errors raised while building scheduler inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SrsError {
    /// A quality grade outside `0..=5`.
    #[error("quality {0} out of range 0..={max}", max = MAX_QUALITY)]
    QualityOutOfRange(i64),

    /// A required text field was empty after trimming.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}
