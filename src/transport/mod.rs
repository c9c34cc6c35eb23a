//! Transport abstraction layer
//!
//! Defines the narrow interface between the chat client and the network so
//! the decode pipeline can be driven by synthetic chunk sequences in tests.

pub mod http;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde_json::Value;

use crate::chat::events::is_truthy;
use crate::chat::models::{ChatId, ChatRequest, ChatSummary, NewChatRequest, NewChatResponse};
use crate::error::{ClientResult, BLOCKED_MESSAGE};

pub use http::HttpTransport;

/// Stream of raw response-body chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = ClientResult<Bytes>> + Send>>;

/// Trait defining the interface to the answer service
///
/// Every call carries the caller's opaque bearer token; the transport never
/// acquires or refreshes tokens itself.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Get the transport name for logging
    fn name(&self) -> &'static str;

    /// Send a chat turn and return the streaming body.
    ///
    /// Returns `ClientError::Rejected` when the service refuses the request
    /// before streaming (non-2xx, or a JSON `error`/`blocked` body).
    async fn open_chat_stream(&self, request: &ChatRequest, token: &str)
        -> ClientResult<ByteStream>;

    /// Create a chat session
    async fn create_chat(
        &self,
        request: &NewChatRequest,
        token: &str,
    ) -> ClientResult<NewChatResponse>;

    /// List the user's chat sessions
    async fn list_chats(&self, user_id: &str, token: &str) -> ClientResult<Vec<ChatSummary>>;

    /// Ask the service to title a chat from its content
    async fn generate_title(&self, chat_id: &ChatId, token: &str) -> ClientResult<String>;
}

/// Message for a non-2xx response: the body's `message`, else a string
/// `error`, else a status-derived fallback.
pub fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| json_error_text(&value))
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

/// Message for a 2xx JSON body that blocks the request, if it does.
pub fn blocked_message(body: &Value) -> Option<String> {
    if !is_truthy(body.get("error")) && !is_truthy(body.get("blocked")) {
        return None;
    }
    Some(json_error_text(body).unwrap_or_else(|| BLOCKED_MESSAGE.to_string()))
}

fn json_error_text(value: &Value) -> Option<String> {
    let non_empty = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    non_empty(value.get("message")).or_else(|| non_empty(value.get("error")))
}
