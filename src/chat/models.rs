//! Chat data model and wire types
//!
//! Field names follow the answer service's JSON, which mixes camelCase
//! (`conversationHistory`) and snake_case (`user_id`, `chat_id`).

use serde::{Deserialize, Serialize};

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single conversation message, as sent in the history payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Source category of a citation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    Quran,
    Hadith,
    Dua,
    /// A category this client does not know yet
    #[serde(other)]
    Other,
}

/// A retrieved source passage attached to an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: CitationKind,
    pub reference: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Server-assigned chat session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub String);

impl ChatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "conversationHistory")]
    pub conversation_history: Vec<Message>,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
}

/// Body of `POST /api/chats/new`
#[derive(Debug, Clone, Serialize)]
pub struct NewChatRequest {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Response of `POST /api/chats/new`
#[derive(Debug, Clone, Deserialize)]
pub struct NewChatResponse {
    pub id: ChatId,
}

/// One entry of the chat history listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Response of `GET /api/chats`, which is either a bare array or wrapped
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatListResponse {
    Bare(Vec<ChatSummary>),
    Wrapped { chats: Vec<ChatSummary> },
}

impl ChatListResponse {
    pub fn into_chats(self) -> Vec<ChatSummary> {
        match self {
            ChatListResponse::Bare(chats) | ChatListResponse::Wrapped { chats } => chats,
        }
    }
}

/// Response of `POST /api/chats/:id/generate-title`
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedTitle {
    pub title: String,
}
