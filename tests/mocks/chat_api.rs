//! Mock answer service for testing
//!
//! Provides wiremock-based mocks for the answer service endpoints:
//! - POST /api/chat - Streaming chat turn (SSE)
//! - POST /api/chats/new - Create a chat session
//! - GET /api/chats - List chat sessions
//! - POST /api/chats/{id}/generate-title - Title a chat
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::mocks::chat_api::{ChatApiTestData, MockChatApi};
//!
//! #[tokio::test]
//! async fn test_with_chat_mock() {
//!     let mock_server = MockChatApi::start().await;
//!     mock_server
//!         .mock_chat_stream(&ChatApiTestData::answer(&["Peace", " be upon you"]))
//!         .await;
//!
//!     // Use mock_server.uri() as HIKMAH_API_URL
//! }
//! ```

use serde_json::{json, Value};
use wiremock::{
    matchers::{header_exists, method, path, path_regex, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Mock answer service wrapper
pub struct MockChatApi {
    server: MockServer,
}

impl MockChatApi {
    /// Start a new mock server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the mock server URI
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Get all received requests (for assertion in tests)
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Received requests for one path
    pub async fn requests_to(&self, request_path: &str) -> Vec<wiremock::Request> {
        self.received_requests()
            .await
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .collect()
    }

    /// JSON bodies of every chat turn sent so far
    pub async fn chat_bodies(&self) -> Vec<Value> {
        self.requests_to("/api/chat")
            .await
            .iter()
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }

    // =========================================================================
    // POST /api/chat - Streaming turn
    // =========================================================================

    /// Mock a 200 SSE response with the given raw body
    pub async fn mock_chat_stream(&self, sse_body: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(header_exists("Authorization"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(sse_body.as_bytes().to_vec(), "text/event-stream")
                    .insert_header("Cache-Control", "no-cache"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a non-2xx rejection with a JSON body
    pub async fn mock_chat_rejected(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a non-2xx rejection whose body is not JSON
    pub async fn mock_chat_rejected_plain(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(status).set_body_raw(body.as_bytes().to_vec(), "text/html"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a 2xx JSON body that refuses the question
    pub async fn mock_chat_blocked(&self, message: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "blocked": true, "message": message })),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a 2xx JSON body carrying one complete frame instead of a stream
    pub async fn mock_chat_single_json(&self, frame: Value) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(frame))
            .mount(&self.server)
            .await;
    }

    /// Mock a 2xx response declared as JSON whose body does not parse
    pub async fn mock_chat_broken_json(&self, body: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.as_bytes().to_vec(), "application/json"),
            )
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // POST /api/chats/new - Session creation
    // =========================================================================

    /// Mock successful session creation
    pub async fn mock_create_chat_success(&self, chat_id: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chats/new"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": chat_id })))
            .mount(&self.server)
            .await;
    }

    /// Mock failed session creation
    pub async fn mock_create_chat_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/chats/new"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(json!({ "error": "Failed to create chat" })),
            )
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // GET /api/chats - Listing
    // =========================================================================

    /// Mock the chat listing for a user
    pub async fn mock_list_chats(&self, user_id: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path("/api/chats"))
            .and(query_param("user_id", user_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // POST /api/chats/{id}/generate-title
    // =========================================================================

    /// Mock title generation for any chat
    pub async fn mock_generate_title(&self, title: &str) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/api/chats/[^/]+/generate-title$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": title })))
            .mount(&self.server)
            .await;
    }

    /// Mock a title generation failure
    pub async fn mock_generate_title_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/api/chats/[^/]+/generate-title$"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": true,
                "message": "Chat not found"
            })))
            .mount(&self.server)
            .await;
    }
}

/// Builders for SSE bodies
pub struct ChatApiTestData;

impl ChatApiTestData {
    /// Render frames as `data:` lines
    pub fn sse(frames: &[Value]) -> String {
        frames
            .iter()
            .map(|frame| format!("data: {}\n\n", frame))
            .collect()
    }

    /// Token frames followed by a sources frame and the `[DONE]` sentinel
    pub fn answer(tokens: &[&str]) -> String {
        let mut frames: Vec<Value> = tokens.iter().map(|t| json!({ "response": t })).collect();
        frames.push(json!({ "sources": [Self::quran_citation()] }));
        let mut body = Self::sse(&frames);
        body.push_str("data: [DONE]\n\n");
        body
    }

    /// Answer ending with an explicit `done` frame instead of the sentinel
    pub fn answer_with_done_flag(tokens: &[&str]) -> String {
        let mut frames: Vec<Value> = tokens.iter().map(|t| json!({ "response": t })).collect();
        frames.push(json!({ "done": true }));
        Self::sse(&frames)
    }

    pub fn quran_citation() -> Value {
        json!({
            "type": "quran",
            "reference": "Al-Baqarah 2:153",
            "text": "O you who have believed, seek help through patience and prayer.",
            "score": 0.92
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let mock = MockChatApi::start().await;
        assert!(!mock.uri().is_empty());
    }

    #[tokio::test]
    async fn test_mock_chat_stream_serves_sse() {
        let mock = MockChatApi::start().await;
        mock.mock_chat_stream(&ChatApiTestData::answer(&["a", "b"]))
            .await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/chat", mock.uri()))
            .header("Authorization", "Bearer test-token")
            .json(&json!({ "message": "hi" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "text/event-stream"
        );
        let body = response.text().await.unwrap();
        assert!(body.starts_with("data: {\"response\":\"a\"}\n\n"));
        assert!(body.ends_with("data: [DONE]\n\n"));
    }

    #[tokio::test]
    async fn test_mock_chat_requires_auth() {
        let mock = MockChatApi::start().await;
        mock.mock_chat_stream("data: [DONE]\n\n").await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/chat", mock.uri()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_mock_list_chats_matches_user() {
        let mock = MockChatApi::start().await;
        mock.mock_list_chats("user_123", json!([{ "id": "c1", "title": "Sabr" }]))
            .await;

        let body: Value = reqwest::Client::new()
            .get(format!("{}/api/chats?user_id=user_123", mock.uri()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body[0]["id"], "c1");
    }

    #[tokio::test]
    async fn test_received_requests_are_recorded() {
        let mock = MockChatApi::start().await;
        mock.mock_create_chat_success("chat-9").await;

        reqwest::Client::new()
            .post(format!("{}/api/chats/new", mock.uri()))
            .header("Authorization", "Bearer t")
            .json(&json!({ "user_id": "u" }))
            .send()
            .await
            .unwrap();

        assert_eq!(mock.requests_to("/api/chats/new").await.len(), 1);
        assert!(mock.chat_bodies().await.is_empty());
    }

    #[test]
    fn test_answer_body_shape() {
        let body = ChatApiTestData::answer_with_done_flag(&["x"]);
        assert_eq!(body, "data: {\"response\":\"x\"}\n\ndata: {\"done\":true}\n\n");
    }
}
