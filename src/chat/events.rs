//! Chat stream events
//!
//! [`ChatFrame`] is the JSON carried by one SSE data line. [`StreamEvent`] is
//! what a caller observes, delivered through a [`StreamSink`].

use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::debug;

use super::models::Citation;

/// JSON payload of one `data: ` line.
///
/// Every field is optional and read independently, so a single frame may
/// combine several of them (a final token together with `done: true`). A
/// field of the wrong type is treated as absent; it never discards the
/// other fields.
#[derive(Debug, Clone, Default)]
pub struct ChatFrame {
    fields: Map<String, Value>,
}

impl ChatFrame {
    /// Parse a payload. Fails when it is not a JSON object.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(payload)?;
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(<serde_json::Error as serde::de::Error>::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Whether the frame declares an error (`true` or a non-empty string)
    pub fn is_error(&self) -> bool {
        is_truthy(self.fields.get("error"))
    }

    /// Error text carried by the frame: `message`, else a string `error`
    pub fn error_message(&self) -> Option<&str> {
        non_empty_str(self.fields.get("message"))
            .or_else(|| non_empty_str(self.fields.get("error")))
    }

    /// Token text, if any
    pub fn token(&self) -> Option<&str> {
        non_empty_str(self.fields.get("response"))
    }

    /// Well-formed citations, if any. Entries that do not decode are dropped
    /// one by one.
    pub fn take_sources(&mut self) -> Option<Vec<Citation>> {
        let Some(Value::Array(items)) = self.fields.remove("sources") else {
            return None;
        };

        let total = items.len();
        let citations: Vec<Citation> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Citation>(item) {
                Ok(citation) => Some(citation),
                Err(e) => {
                    debug!(error = %e, "Dropping malformed citation");
                    None
                }
            })
            .collect();

        if citations.len() < total {
            debug!(kept = citations.len(), total, "Some citations were dropped");
        }
        (!citations.is_empty()).then_some(citations)
    }

    pub fn is_done(&self) -> bool {
        self.fields
            .get("done")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// JSON truthiness for loosely-typed flags such as `error` and `blocked`
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// A semantic event of one chat stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A fragment of the answer text
    Token(String),
    /// Citations for the answer so far
    Sources(Vec<Citation>),
    /// The answer finished successfully (terminal)
    Complete,
    /// The answer failed (terminal)
    Error(String),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete | StreamEvent::Error(_))
    }
}

/// Receiver of one stream's events.
///
/// At most one of `on_complete` / `on_error` is called, and nothing is
/// called after it.
pub trait StreamSink: Send {
    fn on_token(&mut self, text: &str);
    fn on_sources(&mut self, citations: Vec<Citation>);
    fn on_complete(&mut self);
    fn on_error(&mut self, message: &str);
}

impl StreamSink for mpsc::UnboundedSender<StreamEvent> {
    // A closed receiver means the caller stopped listening; drop silently.
    fn on_token(&mut self, text: &str) {
        let _ = self.send(StreamEvent::Token(text.to_string()));
    }

    fn on_sources(&mut self, citations: Vec<Citation>) {
        let _ = self.send(StreamEvent::Sources(citations));
    }

    fn on_complete(&mut self) {
        let _ = self.send(StreamEvent::Complete);
    }

    fn on_error(&mut self, message: &str) {
        let _ = self.send(StreamEvent::Error(message.to_string()));
    }
}

impl StreamSink for Vec<StreamEvent> {
    fn on_token(&mut self, text: &str) {
        self.push(StreamEvent::Token(text.to_string()));
    }

    fn on_sources(&mut self, citations: Vec<Citation>) {
        self.push(StreamEvent::Sources(citations));
    }

    fn on_complete(&mut self) {
        self.push(StreamEvent::Complete);
    }

    fn on_error(&mut self, message: &str) {
        self.push(StreamEvent::Error(message.to_string()));
    }
}

impl<S: StreamSink + ?Sized> StreamSink for &mut S {
    fn on_token(&mut self, text: &str) {
        (**self).on_token(text);
    }

    fn on_sources(&mut self, citations: Vec<Citation>) {
        (**self).on_sources(citations);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }

    fn on_error(&mut self, message: &str) {
        (**self).on_error(message);
    }
}
