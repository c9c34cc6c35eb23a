//! Hikmah - streaming chat client for a retrieval-augmented answer service
//!
//! This library sends a user's question to the answer service and
//! reconstructs the streamed answer, its citations and the completion or
//! error signal from the chunked SSE response.

pub mod chat;
pub mod config;
pub mod error;
pub mod streaming;
pub mod telemetry;
pub mod transport;

pub use crate::chat::{
    ChatClient, Citation, CitationKind, DisplayMessage, Message, ReplyBuffer, Role,
    SessionManager, StreamEvent, StreamSink, TurnHandle, TurnOutcome,
};
pub use crate::config::Config;
pub use crate::error::{ClientError, ClientResult};
pub use crate::transport::{ChatTransport, HttpTransport};
