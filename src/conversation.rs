use crate::models::chat::{ConversationMessage, Sender};

pub const THINKING_MARKER: &str = "🤔";
pub const THINKING_TEXT: &str = "🤔 Searching for an answer...";

/// Ordered, append-only message list. The only removal allowed is the
/// trailing "thinking" placeholder.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ConversationMessage) -> &ConversationMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn push_placeholder(&mut self) -> &ConversationMessage {
        self.push(ConversationMessage::assistant(THINKING_TEXT))
    }

    /// Removes the last message if it still carries the thinking marker.
    pub fn remove_placeholder(&mut self) -> bool {
        let is_placeholder = self
            .messages
            .last()
            .map(|m| m.sender == Sender::Assistant && m.text.contains(THINKING_MARKER))
            .unwrap_or(false);
        if is_placeholder {
            self.messages.pop();
        }
        is_placeholder
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
