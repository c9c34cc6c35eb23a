//! Chat client
//!
//! One call per user turn: ensure a session, build the history payload,
//! open the stream and drive the decode pipeline until a terminal event.

use std::sync::Arc;
use std::time::Instant;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::dispatcher::{EventDispatcher, StreamState};
use super::events::{StreamEvent, StreamSink};
use super::history::{build_history, completed_turns, DisplayMessage};
use super::models::{ChatId, ChatRequest, ChatSummary, Role};
use super::session::SessionManager;
use crate::{
    config::Config,
    error::{ClientError, ClientResult, TRANSPORT_FAILURE_MESSAGE},
    streaming::SsePipeline,
    telemetry,
    transport::{ByteStream, ChatTransport, HttpTransport},
};

/// Summary of a finished turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// `Done` or `Errored`
    pub state: StreamState,
    /// Session the turn was attached to, if any
    pub chat_id: Option<ChatId>,
    /// Token events delivered
    pub tokens: u64,
    /// Malformed frames skipped
    pub frames_skipped: u64,
}

/// Client for the streaming chat endpoint and its auxiliary calls
pub struct ChatClient {
    transport: Arc<dyn ChatTransport>,
    user_id: String,
    auth_token: String,
    max_history_messages: usize,
}

impl ChatClient {
    /// Create a client over an explicit transport
    pub fn new(transport: Arc<dyn ChatTransport>, config: &Config) -> Self {
        Self {
            transport,
            user_id: config.user_id.clone(),
            auth_token: config.auth_token.clone(),
            max_history_messages: config.max_history_messages,
        }
    }

    /// Create a client talking HTTP to the configured service
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let http = HttpTransport::build_client(config)?;
        let transport: Arc<dyn ChatTransport> = Arc::new(HttpTransport::new(http, config));
        Ok(Self::new(transport, config))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Build the request body for the turn whose user message ends `turns`.
    pub fn build_request(
        &self,
        turns: &[DisplayMessage],
        chat_id: Option<ChatId>,
    ) -> ClientResult<ChatRequest> {
        let message = match turns.last() {
            Some(last) if last.is_conversational() && last.message.role == Role::User => {
                last.message.content.clone()
            }
            _ => {
                return Err(ClientError::InvalidRequest(
                    "The last message of a turn must be the user's".to_string(),
                ))
            }
        };

        if message.trim().is_empty() {
            return Err(ClientError::InvalidRequest("Message is empty".to_string()));
        }

        Ok(ChatRequest {
            message,
            conversation_history: build_history(turns, self.max_history_messages),
            user_id: self.user_id.clone(),
            chat_id,
        })
    }

    /// Prepare a turn: validate, ensure the session and build the request.
    async fn prepare_turn(
        &self,
        sessions: &mut SessionManager,
        turns: &[DisplayMessage],
    ) -> ClientResult<ChatRequest> {
        // Validate before a session is created for an unusable turn.
        let mut request = self.build_request(turns, None)?;
        request.chat_id = sessions
            .ensure_session(
                self.transport.as_ref(),
                completed_turns(turns),
                &request.message,
                &self.user_id,
                &self.auth_token,
            )
            .await;
        Ok(request)
    }

    /// Send the user's latest message and stream the answer into `sink`.
    ///
    /// `turns` is the UI's full list with the new user message already
    /// appended. Invalid input is returned as `Err` before any callback;
    /// everything after that is reported through the sink. Dropping the
    /// returned future cancels the turn without further callbacks.
    #[instrument(skip_all, fields(turns = turns.len()))]
    pub async fn send_message<S: StreamSink>(
        &self,
        sessions: &mut SessionManager,
        turns: &[DisplayMessage],
        sink: S,
    ) -> ClientResult<TurnOutcome> {
        let request = self.prepare_turn(sessions, turns).await?;
        Ok(run_turn(self.transport.as_ref(), request, &self.auth_token, sink).await)
    }

    /// Like [`send_message`](Self::send_message), but the read loop runs on
    /// its own task and events are delivered through the returned handle.
    pub async fn spawn_message(
        &self,
        sessions: &mut SessionManager,
        turns: &[DisplayMessage],
    ) -> ClientResult<TurnHandle> {
        let request = self.prepare_turn(sessions, turns).await?;
        let chat_id = request.chat_id.clone();
        let (tx, rx) = mpsc::unbounded_channel();

        let transport = Arc::clone(&self.transport);
        let token = self.auth_token.clone();
        let task = tokio::spawn(async move { run_turn(transport.as_ref(), request, &token, tx).await });

        Ok(TurnHandle {
            events: rx,
            task: Some(task),
            chat_id,
        })
    }

    /// List the user's chat sessions
    pub async fn list_chats(&self) -> ClientResult<Vec<ChatSummary>> {
        self.transport
            .list_chats(&self.user_id, &self.auth_token)
            .await
    }

    /// Ask the service for a title summarising a chat
    pub async fn generate_title(&self, chat_id: &ChatId) -> ClientResult<String> {
        self.transport.generate_title(chat_id, &self.auth_token).await
    }
}

/// A turn running on its own task.
///
/// Dropping the handle (or calling [`abort`](Self::abort)) stops the read
/// loop; no event is observed afterwards.
pub struct TurnHandle {
    events: mpsc::UnboundedReceiver<StreamEvent>,
    task: Option<JoinHandle<TurnOutcome>>,
    chat_id: Option<ChatId>,
}

impl TurnHandle {
    /// Session the turn is attached to
    pub fn chat_id(&self) -> Option<&ChatId> {
        self.chat_id.as_ref()
    }

    /// Next event; `None` once the terminal event has been received.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// Stop the turn
    pub fn abort(self) {
        drop(self);
    }

    /// Wait for the read loop to finish and return its outcome
    pub async fn join(mut self) -> ClientResult<TurnOutcome> {
        let task = self
            .task
            .take()
            .ok_or_else(|| ClientError::Internal(anyhow::anyhow!("Turn already joined")))?;
        task.await
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("Turn task failed: {}", e)))
    }

    /// Events as a `Stream`, ending after the terminal event
    pub fn into_stream(self) -> impl Stream<Item = StreamEvent> + Send {
        let mut handle = self;
        async_stream::stream! {
            while let Some(event) = handle.events.recv().await {
                yield event;
            }
        }
    }
}

impl Drop for TurnHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("Aborting in-flight turn");
            }
            task.abort();
        }
    }
}

/// Open the stream for one request and dispatch it to `sink`.
pub async fn run_turn<S: StreamSink>(
    transport: &dyn ChatTransport,
    request: ChatRequest,
    token: &str,
    sink: S,
) -> TurnOutcome {
    let started = Instant::now();
    let chat_id = request.chat_id.clone();
    let mut dispatcher = EventDispatcher::new(sink);

    info!(
        transport = transport.name(),
        chat_id = ?chat_id,
        history = request.conversation_history.len(),
        "Sending chat turn"
    );

    match transport.open_chat_stream(&request, token).await {
        Ok(body) => drive_stream(body, &mut dispatcher).await,
        Err(e) => {
            warn!(error = %e, "Chat request failed before streaming");
            dispatcher.fail(&e.user_message());
        }
    }

    let outcome = TurnOutcome {
        state: dispatcher.state(),
        chat_id,
        tokens: dispatcher.tokens_delivered(),
        frames_skipped: dispatcher.frames_skipped(),
    };

    let duration = started.elapsed().as_secs_f64();
    telemetry::record_stream(outcome.state, duration);
    telemetry::record_tokens(outcome.tokens);

    info!(
        state = ?outcome.state,
        tokens = outcome.tokens,
        duration_ms = %format!("{:.2}", duration * 1000.0),
        "Chat turn finished"
    );

    outcome
}

/// Read loop: feed body chunks through the pipeline into the dispatcher.
///
/// Stops reading as soon as the dispatcher reaches a terminal state; bytes
/// still in flight after that are not processed.
pub async fn drive_stream<S: StreamSink>(
    mut body: ByteStream,
    dispatcher: &mut EventDispatcher<S>,
) {
    dispatcher.open();
    let mut pipeline = SsePipeline::new();

    while let Some(chunk) = body.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Stream transport error");
                dispatcher.fail(TRANSPORT_FAILURE_MESSAGE);
                return;
            }
        };

        for line in pipeline.feed(&bytes) {
            dispatcher.handle_line(&line);
            if dispatcher.is_terminal() {
                return;
            }
        }
    }

    pipeline.finish();
    dispatcher.end_of_stream();
}
