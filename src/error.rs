//! Error types for Hikmah
//!
//! This module defines the error taxonomy used throughout the client.
//! Only request-level and server-declared errors ever reach a caller's
//! sink; per-frame decode problems are handled inside the pipeline.

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown when the server could not be reached at all
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

/// Message used when an error frame carries no message of its own
pub const STREAM_FAILURE_MESSAGE: &str = "An error occurred while generating the response";

/// Message used when a 2xx JSON body blocks the request without explanation
pub const BLOCKED_MESSAGE: &str = "Your message could not be processed";

/// Client-level errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// The text a chat UI should show for this error.
    ///
    /// Rejections carry the server's own wording; anything that happened
    /// below HTTP collapses to a generic connectivity message.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Rejected { message, .. } => message.clone(),
            ClientError::Upstream(message) => message.clone(),
            ClientError::Http(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
            ClientError::InvalidRequest(message) => message.clone(),
            ClientError::Json(_) | ClientError::Internal(_) | ClientError::Config(_) => {
                STREAM_FAILURE_MESSAGE.to_string()
            }
        }
    }

    /// Status code of an HTTP-level rejection, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type ClientResult<T> = Result<T, ClientError>;
