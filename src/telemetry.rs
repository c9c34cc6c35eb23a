//! Client metrics
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! embedding application installs a recorder.

use crate::chat::dispatcher::StreamState;

/// Describe all client metrics (call once at startup, after installing a recorder)
pub fn init_metrics() {
    metrics::describe_counter!(
        "hikmah_streams_total",
        "Total number of chat streams by outcome"
    );
    metrics::describe_counter!(
        "hikmah_tokens_received_total",
        "Total token events received"
    );
    metrics::describe_counter!(
        "hikmah_frames_skipped_total",
        "Malformed stream frames skipped"
    );
    metrics::describe_counter!(
        "hikmah_session_creations_total",
        "Chat session creation attempts"
    );
    metrics::describe_histogram!(
        "hikmah_stream_duration_seconds",
        "Chat stream duration in seconds"
    );
}

/// Record a finished stream
pub fn record_stream(state: StreamState, duration_secs: f64) {
    let outcome = match state {
        StreamState::Done => "complete",
        StreamState::Errored => "error",
        StreamState::Idle | StreamState::Streaming => "abandoned",
    };
    metrics::counter!("hikmah_streams_total", "outcome" => outcome).increment(1);
    metrics::histogram!("hikmah_stream_duration_seconds").record(duration_secs);
}

/// Record token events received
pub fn record_tokens(count: u64) {
    metrics::counter!("hikmah_tokens_received_total").increment(count);
}

/// Record a skipped frame
pub fn record_frame_skipped() {
    metrics::counter!("hikmah_frames_skipped_total").increment(1);
}

/// Record a session creation attempt
pub fn record_session_creation(result: &'static str) {
    metrics::counter!("hikmah_session_creations_total", "result" => result).increment(1);
}
