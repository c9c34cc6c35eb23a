//! Chat session management
//!
//! A conversation gets a server-side session on its first user turn. The
//! id is then reused for every later turn of the same conversation. Failing
//! to create one never blocks the answer itself.

use tracing::{debug, instrument, warn};

use super::models::{ChatId, NewChatRequest};
use crate::telemetry;
use crate::transport::ChatTransport;

/// Maximum number of characters of the first message used as a title
pub const TITLE_MAX_CHARS: usize = 50;

/// Derive a short session title from the user's first message
pub fn title_from_message(message: &str) -> String {
    let trimmed = message.trim();
    let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        title = title.trim_end().to_string();
        title.push_str("...");
    }
    title
}

/// Owns the session id of one conversation.
#[derive(Debug, Default)]
pub struct SessionManager {
    chat_id: Option<ChatId>,
}

impl SessionManager {
    /// A conversation with no session yet
    pub fn new() -> Self {
        Self { chat_id: None }
    }

    /// Resume an existing session
    pub fn with_chat_id(chat_id: ChatId) -> Self {
        Self {
            chat_id: Some(chat_id),
        }
    }

    pub fn chat_id(&self) -> Option<&ChatId> {
        self.chat_id.as_ref()
    }

    /// Adopt a session picked from the chat listing
    pub fn attach(&mut self, chat_id: ChatId) {
        self.chat_id = Some(chat_id);
    }

    /// Forget the session (conversation view torn down or "new chat")
    pub fn reset(&mut self) {
        self.chat_id = None;
    }

    /// Return the session id for this turn, creating it on the first turn.
    ///
    /// `completed_turns` is the number of assistant replies already in the
    /// conversation. An existing id is returned without any request. A
    /// failed creation is logged and yields `None`; the turn goes ahead
    /// without a session.
    #[instrument(skip(self, transport, message, user_id, token), fields(has_session = self.chat_id.is_some()))]
    pub async fn ensure_session(
        &mut self,
        transport: &dyn ChatTransport,
        completed_turns: usize,
        message: &str,
        user_id: &str,
        token: &str,
    ) -> Option<ChatId> {
        if let Some(chat_id) = &self.chat_id {
            return Some(chat_id.clone());
        }

        if completed_turns > 0 {
            debug!(completed_turns, "No session for an ongoing conversation; not creating one");
            return None;
        }

        let request = NewChatRequest {
            user_id: user_id.to_string(),
            title: Some(title_from_message(message)),
        };

        match transport.create_chat(&request, token).await {
            Ok(created) => {
                telemetry::record_session_creation("success");
                debug!(chat_id = %created.id, "Session created");
                self.chat_id = Some(created.id.clone());
                Some(created.id)
            }
            Err(e) => {
                telemetry::record_session_creation("failure");
                warn!(error = %e, "Failed to create chat session; continuing without one");
                None
            }
        }
    }
}
