//! A single pass through a study queue.

use time::OffsetDateTime;

use crate::card::Flashcard;
use crate::schedule::Quality;

/// Walks a queue one card at a time, re-scheduling each on answer.
#[derive(Debug, Clone)]
pub struct StudySession {
    queue: Vec<Flashcard>,
    position: usize,
}

impl StudySession {
    /// Start a session, or `None` if there is nothing to study.
    #[must_use]
    pub fn new(queue: Vec<Flashcard>) -> Option<Self> {
        if queue.is_empty() {
            return None;
        }
        Some(Self { queue, position: 0 })
    }

    /// The card waiting for an answer.
    #[must_use]
    pub fn current(&self) -> Option<&Flashcard> {
        self.queue.get(self.position)
    }

    /// Grade the current card and move on.
    ///
    /// Returns the re-scheduled card for the caller to persist, or `None`
    /// once the session is finished.
    pub fn answer(&mut self, quality: Quality, now: OffsetDateTime) -> Option<Flashcard> {
        let card = self.queue.get_mut(self.position)?;
        card.review(quality, now);
        let updated = card.clone();
        self.position += 1;
        Some(updated)
    }

    /// Cards answered so far, out of the queue length.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.position, self.queue.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.queue.len()
    }

    /// Consume the session, returning every card in its latest state.
    #[must_use]
    pub fn into_cards(self) -> Vec<Flashcard> {
        self.queue
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
