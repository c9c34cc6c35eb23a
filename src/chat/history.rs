//! Conversation history builder
//!
//! The UI keeps more entries than the server should see: a greeting,
//! apology bubbles, the in-progress assistant reply. Only real user and
//! assistant messages are sent, in order, bounded to the most recent ones.

use super::models::{Message, Role};

/// Reserved id of the synthetic greeting shown at the top of a new chat
pub const WELCOME_MESSAGE_ID: &str = "welcome";

/// A message as held by the UI
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayMessage {
    pub id: String,
    pub message: Message,
    /// UI-only entry (greeting, apology) that must never reach the server
    pub placeholder: bool,
}

impl DisplayMessage {
    pub fn new(id: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            message,
            placeholder: false,
        }
    }

    pub fn placeholder(id: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            message,
            placeholder: true,
        }
    }

    /// The greeting shown before the first turn
    pub fn welcome(text: impl Into<String>) -> Self {
        Self::placeholder(WELCOME_MESSAGE_ID, Message::assistant(text))
    }

    /// Whether this entry is authored content the server should see
    pub fn is_conversational(&self) -> bool {
        if self.placeholder || self.id == WELCOME_MESSAGE_ID {
            return false;
        }
        match self.message.role {
            Role::Assistant => !self.message.content.trim().is_empty(),
            Role::User | Role::System => true,
        }
    }
}

/// Filter the UI's turns into the history payload.
///
/// The just-submitted user message is expected to be the last entry
/// already; nothing is appended here. At most `max_messages` of the most
/// recent entries are kept (`0` means unbounded).
pub fn build_history(turns: &[DisplayMessage], max_messages: usize) -> Vec<Message> {
    let history: Vec<Message> = turns
        .iter()
        .filter(|turn| turn.is_conversational())
        .map(|turn| turn.message.clone())
        .collect();

    if max_messages == 0 || history.len() <= max_messages {
        return history;
    }

    history[history.len() - max_messages..].to_vec()
}

/// Number of real assistant replies in the conversation so far
pub fn completed_turns(turns: &[DisplayMessage]) -> usize {
    turns
        .iter()
        .filter(|turn| turn.is_conversational() && turn.message.role == Role::Assistant)
        .count()
}
