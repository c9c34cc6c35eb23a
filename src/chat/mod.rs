//! Chat protocol module
//!
//! Sessions, history, event dispatch and the per-turn client.

pub mod client;
pub mod dispatcher;
pub mod events;
pub mod history;
pub mod models;
pub mod reply;
pub mod session;

pub use client::{ChatClient, TurnHandle, TurnOutcome};
pub use dispatcher::{EventDispatcher, StreamState};
pub use events::{ChatFrame, StreamEvent, StreamSink};
pub use history::{build_history, completed_turns, DisplayMessage, WELCOME_MESSAGE_ID};
pub use models::*;
pub use reply::{CitationMerge, ReplyBuffer, ReplyStatus};
pub use session::SessionManager;
