//! Event dispatcher: per-request stream state machine
//!
//! `Idle -> Streaming -> {Done | Errored}`. The sink is owned by the
//! dispatcher only while the stream is live; the terminal transition moves
//! it out, which is what guarantees a single terminal event and silence
//! afterwards.

use tracing::{debug, warn};

use super::events::{ChatFrame, StreamSink};
use crate::error::STREAM_FAILURE_MESSAGE;
use crate::streaming::{parse_line, SseFrame};
use crate::telemetry;

/// Stream lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Streaming,
    Done,
    Errored,
}

impl StreamState {
    pub fn is_terminal(self) -> bool {
        matches!(self, StreamState::Done | StreamState::Errored)
    }
}

/// Dispatches parsed frames of one response to a [`StreamSink`].
pub struct EventDispatcher<S: StreamSink> {
    state: StreamState,
    sink: Option<S>,
    tokens: u64,
    skipped_frames: u64,
}

impl<S: StreamSink> EventDispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: StreamState::Idle,
            sink: Some(sink),
            tokens: 0,
            skipped_frames: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Number of token events delivered so far
    pub fn tokens_delivered(&self) -> u64 {
        self.tokens
    }

    /// Number of malformed frames skipped so far
    pub fn frames_skipped(&self) -> u64 {
        self.skipped_frames
    }

    /// Response headers accepted, body readable.
    pub fn open(&mut self) {
        if self.state == StreamState::Idle {
            self.state = StreamState::Streaming;
        }
    }

    /// Handle one complete SSE line.
    pub fn handle_line(&mut self, line: &str) {
        if self.state != StreamState::Streaming {
            return;
        }

        match parse_line(line) {
            SseFrame::Ignored => {}
            SseFrame::Done => {
                debug!("Received stream sentinel");
                self.complete();
            }
            SseFrame::Data(payload) => self.dispatch_payload(payload),
        }
    }

    /// Parse and dispatch a non-sentinel payload.
    ///
    /// Within one frame the order is: error, token, sources, done.
    pub fn dispatch_payload(&mut self, payload: &str) {
        if self.state != StreamState::Streaming || payload.is_empty() {
            return;
        }

        let mut frame = match ChatFrame::parse(payload) {
            Ok(frame) => frame,
            Err(e) => {
                self.skipped_frames += 1;
                telemetry::record_frame_skipped();
                warn!(error = %e, payload_len = payload.len(), "Skipping malformed stream frame");
                return;
            }
        };

        if frame.is_error() {
            let message = frame
                .error_message()
                .unwrap_or(STREAM_FAILURE_MESSAGE)
                .to_string();
            warn!(message = %message, "Server reported a stream error");
            self.fail(&message);
            return;
        }

        if let Some(sink) = self.sink.as_mut() {
            if let Some(token) = frame.token() {
                self.tokens += 1;
                sink.on_token(token);
            }

            if let Some(citations) = frame.take_sources() {
                debug!(count = citations.len(), "Received citations");
                sink.on_sources(citations);
            }
        }

        if frame.is_done() {
            self.complete();
        }
    }

    /// `[DONE]`, a done flag or the natural end of the body.
    pub fn complete(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = StreamState::Done;
        if let Some(mut sink) = self.sink.take() {
            sink.on_complete();
        }
    }

    /// The body ended. A stream that never signalled completion still
    /// completes so the caller is not left waiting.
    pub fn end_of_stream(&mut self) {
        if self.state == StreamState::Streaming {
            debug!("Stream ended without completion signal");
        }
        self.complete();
    }

    /// Request-level or mid-stream failure.
    pub fn fail(&mut self, message: &str) {
        if self.state.is_terminal() {
            return;
        }
        self.state = StreamState::Errored;
        if let Some(mut sink) = self.sink.take() {
            sink.on_error(message);
        }
    }

}
