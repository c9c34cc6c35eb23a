//! Session lifecycle integration tests
//!
//! Tests for POST /api/chats/new as driven by chat turns:
//! - The first turn creates a session titled from the question
//! - Later turns reuse the id without another creation call
//! - A failed creation never blocks the answer

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use hikmah::chat::StreamState;
use hikmah::{DisplayMessage, Message, SessionManager, StreamEvent};

use crate::common::{collected_text, constants, first_turn, test_client};
use crate::mocks::{ChatApiTestData, MockChatApi};

#[tokio::test]
async fn test_session_created_once_and_reused() {
    let mock = MockChatApi::start().await;
    mock.mock_create_chat_success("chat-42").await;
    mock.mock_chat_stream(&ChatApiTestData::answer(&["Answer"]))
        .await;

    let client = test_client(&mock.uri());
    let mut sessions = SessionManager::new();

    let mut turns = first_turn("What is dhikr?");
    let mut events: Vec<StreamEvent> = Vec::new();
    let first = client
        .send_message(&mut sessions, &turns, &mut events)
        .await
        .unwrap();
    assert_eq!(first.chat_id.as_ref().map(|id| id.as_str()), Some("chat-42"));

    turns.push(DisplayMessage::new("a1", Message::assistant(collected_text(&events))));
    turns.push(DisplayMessage::new("u2", Message::user("And its benefits?")));
    let mut events: Vec<StreamEvent> = Vec::new();
    let second = client
        .send_message(&mut sessions, &turns, &mut events)
        .await
        .unwrap();
    assert_eq!(second.chat_id, first.chat_id);

    let creations = mock.requests_to("/api/chats/new").await;
    assert_eq!(creations.len(), 1);
    let creation: Value = serde_json::from_slice(&creations[0].body).unwrap();
    assert_eq!(creation["user_id"], constants::TEST_USER_ID);
    assert_eq!(creation["title"], "What is dhikr?");

    let bodies = mock.chat_bodies().await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1]["chat_id"], "chat-42");
    assert_eq!(
        bodies[1]["conversationHistory"],
        json!([
            { "role": "user", "content": "What is dhikr?" },
            { "role": "assistant", "content": "Answer" },
            { "role": "user", "content": "And its benefits?" }
        ])
    );
}

#[tokio::test]
async fn test_creation_failure_still_answers() {
    let mock = MockChatApi::start().await;
    mock.mock_create_chat_failure(500).await;
    mock.mock_chat_stream(&ChatApiTestData::answer(&["Still here"]))
        .await;

    let client = test_client(&mock.uri());
    let mut sessions = SessionManager::new();
    let mut events: Vec<StreamEvent> = Vec::new();

    let outcome = client
        .send_message(&mut sessions, &first_turn("hello"), &mut events)
        .await
        .unwrap();

    assert_eq!(outcome.state, StreamState::Done);
    assert_eq!(outcome.chat_id, None);
    assert_eq!(collected_text(&events), "Still here");

    let bodies = mock.chat_bodies().await;
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].get("chat_id").is_none());
}

#[tokio::test]
async fn test_resumed_session_skips_creation() {
    let mock = MockChatApi::start().await;
    mock.mock_chat_stream(&ChatApiTestData::answer(&["ok"])).await;

    let client = test_client(&mock.uri());
    let mut sessions = SessionManager::with_chat_id("existing-chat".into());
    let mut events: Vec<StreamEvent> = Vec::new();

    client
        .send_message(&mut sessions, &first_turn("hello"), &mut events)
        .await
        .unwrap();

    assert!(mock.requests_to("/api/chats/new").await.is_empty());
    assert_eq!(mock.chat_bodies().await[0]["chat_id"], "existing-chat");
}

#[tokio::test]
async fn test_ongoing_conversation_without_session_does_not_create_one() {
    let mock = MockChatApi::start().await;
    mock.mock_create_chat_success("late-chat").await;
    mock.mock_chat_stream(&ChatApiTestData::answer(&["ok"])).await;

    let client = test_client(&mock.uri());
    let mut sessions = SessionManager::new();
    let mut events: Vec<StreamEvent> = Vec::new();
    let turns = vec![
        DisplayMessage::new("u1", Message::user("first")),
        DisplayMessage::new("a1", Message::assistant("reply")),
        DisplayMessage::new("u2", Message::user("second")),
    ];

    let outcome = client
        .send_message(&mut sessions, &turns, &mut events)
        .await
        .unwrap();

    assert_eq!(outcome.chat_id, None);
    assert!(mock.requests_to("/api/chats/new").await.is_empty());
}
