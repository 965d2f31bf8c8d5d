//! Conversation history and the send loop that keeps it in sync with a
//! streamed reply.

use super::types::{AssistantChat, AssistantError, ChatMessage, ChatOutcome, Role, StudyMode};

/// Ordered chat history shown to the user and sent with each request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPrompt` if `text` is blank.
    pub fn push_user(&mut self, text: &str) -> Result<(), AssistantError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AssistantError::EmptyPrompt);
        }
        self.messages.push(ChatMessage::user(text));
        Ok(())
    }

    /// Show the latest reply snapshot: replace a trailing assistant message,
    /// or start one.
    pub fn apply_snapshot(&mut self, text: &str) {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => {
                last.content.clear();
                last.content.push_str(text);
            }
            _ => self.messages.push(ChatMessage::assistant(text)),
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// A conversation bound to an assistant backend.
pub struct ChatSession<C: AssistantChat> {
    chat: C,
    conversation: Conversation,
}

impl<C: AssistantChat> ChatSession<C> {
    pub fn new(chat: C) -> Self {
        Self { chat, conversation: Conversation::new() }
    }

    /// Send `prompt` with the full history and stream the reply into it.
    ///
    /// Snapshots are applied to the history and then forwarded to
    /// `on_snapshot`. On error the user turn and any partial reply stay in
    /// the history.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPrompt` for a blank prompt, otherwise whatever the
    /// backend returns.
    pub async fn send(
        &mut self,
        prompt: &str,
        mode: StudyMode,
        on_snapshot: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<ChatOutcome, AssistantError> {
        self.conversation.push_user(prompt)?;
        let history = self.conversation.messages().to_vec();

        let conversation = &mut self.conversation;
        let mut apply = |text: &str| {
            conversation.apply_snapshot(text);
            on_snapshot(text);
        };
        self.chat.stream_chat(&history, mode, &mut apply).await
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
