//! SSE (Server-Sent Events) decoding
//!
//! Turns raw response-body chunks into complete SSE lines:
//! bytes -> [`Utf8Decoder`] -> [`LineReassembler`] -> lines, which are then
//! classified one at a time by [`parse_line`].

pub mod decoder;
pub mod frame;
pub mod lines;

pub use decoder::Utf8Decoder;
pub use frame::{parse_line, SseFrame, DATA_PREFIX, DONE_SENTINEL};
pub use lines::LineReassembler;

/// Decode state for one response body.
///
/// Each request gets a fresh pipeline; nothing is shared between requests.
#[derive(Debug, Default)]
pub struct SsePipeline {
    decoder: Utf8Decoder,
    lines: LineReassembler,
}

impl SsePipeline {
    /// Create a pipeline with empty buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk and return the lines it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.decoder.decode(chunk);
        if text.is_empty() {
            return Vec::new();
        }
        self.lines.push(&text)
    }

    /// End of body: partial characters and partial lines are discarded.
    pub fn finish(self) {
        self.decoder.finish();
        self.lines.finish();
    }
}
