//! Caller-side accumulation of one assistant reply

use super::events::{StreamEvent, StreamSink};
use super::models::{Citation, Message};

/// Text shown in place of an assistant reply that failed before any text
pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I couldn't complete that answer. Please try again.";

/// How citations arriving in several frames are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CitationMerge {
    /// Keep every citation in arrival order
    #[default]
    Append,
    /// Each frame's list supersedes the previous one
    Replace,
}

/// Final state of a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyStatus {
    Streaming,
    Complete,
    Failed(String),
}

/// Accumulates one streamed reply: text, citations and outcome.
#[derive(Debug, Clone)]
pub struct ReplyBuffer {
    text: String,
    citations: Vec<Citation>,
    merge: CitationMerge,
    status: ReplyStatus,
}

impl Default for ReplyBuffer {
    fn default() -> Self {
        Self::new(CitationMerge::default())
    }
}

impl ReplyBuffer {
    pub fn new(merge: CitationMerge) -> Self {
        Self {
            text: String::new(),
            citations: Vec::new(),
            merge,
            status: ReplyStatus::Streaming,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn status(&self) -> &ReplyStatus {
        &self.status
    }

    /// Apply one event received through a channel
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Token(text) => self.on_token(&text),
            StreamEvent::Sources(citations) => self.on_sources(citations),
            StreamEvent::Complete => self.on_complete(),
            StreamEvent::Error(message) => self.on_error(&message),
        }
    }

    /// The message to keep in the conversation.
    ///
    /// Tokens that arrived before an error are kept; an error with no text
    /// at all becomes an apology.
    pub fn into_display_text(self) -> String {
        if self.text.is_empty() && matches!(self.status, ReplyStatus::Failed(_)) {
            APOLOGY_MESSAGE.to_string()
        } else {
            self.text
        }
    }

    /// Assistant message for the history, if there is real text
    pub fn to_message(&self) -> Option<Message> {
        (!self.text.trim().is_empty()).then(|| Message::assistant(self.text.clone()))
    }
}

impl StreamSink for ReplyBuffer {
    fn on_token(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn on_sources(&mut self, citations: Vec<Citation>) {
        match self.merge {
            CitationMerge::Append => self.citations.extend(citations),
            CitationMerge::Replace => self.citations = citations,
        }
    }

    fn on_complete(&mut self) {
        self.status = ReplyStatus::Complete;
    }

    fn on_error(&mut self, message: &str) {
        self.status = ReplyStatus::Failed(message.to_string());
    }
}
