//! SSE frame recognition
//!
//! Only `data: ` lines matter to the chat protocol. Every other SSE field,
//! comment or blank line is ignored rather than treated as an error.

/// Prefix of a data line, including the single space
pub const DATA_PREFIX: &str = "data: ";

/// Payload that terminates the stream without a JSON frame
pub const DONE_SENTINEL: &str = "[DONE]";

/// Classification of one SSE line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseFrame<'a> {
    /// Not a data line
    Ignored,
    /// The `[DONE]` sentinel
    Done,
    /// A data payload, trimmed
    Data(&'a str),
}

/// Classify a single line (without its trailing `\n`).
pub fn parse_line(line: &str) -> SseFrame<'_> {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return SseFrame::Ignored;
    };

    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        SseFrame::Done
    } else {
        SseFrame::Data(payload)
    }
}
