//! Common test utilities for Hikmah
//!
//! Shared fixtures and helpers used across the integration tests.

#![allow(dead_code)]

use hikmah::{ChatClient, Config, DisplayMessage, Message, StreamEvent};

/// Test configuration constants
pub mod constants {
    /// Test bearer token
    pub const TEST_AUTH_TOKEN: &str = "test-auth-token";
    /// Test user ID
    pub const TEST_USER_ID: &str = "user_123";
    /// Greeting placeholder text
    pub const TEST_WELCOME: &str = "As-salamu alaykum! How can I help?";
}

/// Configuration pointing at a mock server
pub fn test_config(uri: &str) -> Config {
    let mut config = Config::new(uri, constants::TEST_USER_ID, constants::TEST_AUTH_TOKEN);
    config.request_timeout_seconds = 5;
    config
}

/// HTTP-backed client pointing at a mock server
pub fn test_client(uri: &str) -> ChatClient {
    ChatClient::from_config(&test_config(uri)).expect("client builds")
}

/// A fresh conversation: the greeting followed by one user message
pub fn first_turn(question: &str) -> Vec<DisplayMessage> {
    vec![
        DisplayMessage::welcome(constants::TEST_WELCOME),
        DisplayMessage::new("u1", Message::user(question)),
    ]
}

/// Concatenate the token events
pub fn collected_text(events: &[StreamEvent]) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::Token(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Number of terminal events observed
pub fn terminal_count(events: &[StreamEvent]) -> usize {
    events.iter().filter(|event| event.is_terminal()).count()
}
