//! Flashcards, decks, and due-card selection.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::SrsError;
use crate::schedule::{Quality, ReviewState, schedule};

/// A named group of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
}

impl Deck {
    /// # Errors
    ///
    /// Returns [`SrsError::EmptyField`] when `name` is blank.
    pub fn new(name: &str) -> Result<Self, SrsError> {
        Ok(Self { id: Uuid::new_v4(), name: required_text("deck name", name)? })
    }
}

/// A two-sided card plus its review state.
///
/// The review fields are flattened so the record matches the stored row
/// (`easiness`, `interval`, `repetitions`, `next_review`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    #[serde(flatten)]
    pub review: ReviewState,
}

impl Flashcard {
    /// Author a new card, due immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SrsError::EmptyField`] when either side is blank.
    pub fn new(deck_id: Uuid, front: &str, back: &str, now: OffsetDateTime) -> Result<Self, SrsError> {
        Ok(Self {
            id: Uuid::new_v4(),
            deck_id,
            front: required_text("front", front)?,
            back: required_text("back", back)?,
            review: ReviewState::new(now),
        })
    }

    #[must_use]
    pub fn is_due(&self, now: OffsetDateTime) -> bool {
        self.review.is_due(now)
    }

    /// Apply one answer to this card.
    pub fn review(&mut self, quality: Quality, now: OffsetDateTime) -> &ReviewState {
        self.review = schedule(&self.review, quality, now);
        &self.review
    }
}

/// Card counts for one deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeckStats {
    pub total: usize,
    pub due: usize,
}

#[must_use]
pub fn due_cards(cards: &[Flashcard], now: OffsetDateTime) -> Vec<&Flashcard> {
    cards.iter().filter(|card| card.is_due(now)).collect()
}

#[must_use]
pub fn deck_stats(cards: &[Flashcard], deck_id: Uuid, now: OffsetDateTime) -> DeckStats {
    cards
        .iter()
        .filter(|card| card.deck_id == deck_id)
        .fold(DeckStats::default(), |mut stats, card| {
            stats.total += 1;
            if card.is_due(now) {
                stats.due += 1;
            }
            stats
        })
}

/// Build a shuffled study queue.
///
/// Takes the due cards, optionally restricted to one deck. When nothing is
/// due the whole scope is studied instead, so a session can always start as
/// long as the scope has cards.
pub fn build_study_queue<R: Rng + ?Sized>(
    cards: &[Flashcard],
    deck: Option<Uuid>,
    now: OffsetDateTime,
    rng: &mut R,
) -> Vec<Flashcard> {
    let in_scope = |card: &&Flashcard| deck.is_none_or(|id| card.deck_id == id);

    let mut queue: Vec<Flashcard> = cards
        .iter()
        .filter(in_scope)
        .filter(|card| card.is_due(now))
        .cloned()
        .collect();
    if queue.is_empty() {
        queue = cards.iter().filter(in_scope).cloned().collect();
    }
    queue.shuffle(rng);
    queue
}

/// Drop every card belonging to `deck_id`, returning how many were removed.
pub fn remove_deck_cards(cards: &mut Vec<Flashcard>, deck_id: Uuid) -> usize {
    let before = cards.len();
    cards.retain(|card| card.deck_id != deck_id);
    before - cards.len()
}

fn required_text(field: &'static str, value: &str) -> Result<String, SrsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SrsError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "card_test.rs"]
mod tests;
