//! Line reassembly across fragment boundaries

use tracing::debug;

/// Buffer for accumulating incomplete lines across chunk boundaries.
///
/// Decoded text arrives in fragments that may not align with line boundaries.
/// This buffer accumulates incomplete lines until a complete line (ending with \n)
/// is available for processing.
///
/// # Example
/// ```
/// use hikmah::streaming::LineReassembler;
///
/// let mut lines = LineReassembler::new();
///
/// // First fragment contains partial line
/// assert!(lines.push("data: {\"response\":\"hel").is_empty());
///
/// // Second fragment completes the line
/// assert_eq!(lines.push("lo\"}\n"), vec!["data: {\"response\":\"hello\"}"]);
/// ```
#[derive(Debug, Default)]
pub struct LineReassembler {
    /// Accumulated incomplete line data
    incomplete: String,
    /// Prefix of `incomplete` already searched for a newline
    scanned: usize,
}

impl LineReassembler {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self {
            incomplete: String::new(),
            scanned: 0,
        }
    }

    /// Push a text fragment and return any complete lines.
    ///
    /// The newline is stripped from returned lines; blank lines are returned
    /// as empty strings so the caller sees every line in order. Trailing
    /// data without a newline stays buffered for the next call.
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        self.incomplete.push_str(fragment);

        let mut complete_lines = Vec::new();
        let mut consumed = 0;
        let mut search_from = self.scanned;

        while let Some(offset) = self.incomplete[search_from..].find('\n') {
            let end = search_from + offset;
            complete_lines.push(self.incomplete[consumed..end].to_string());
            consumed = end + 1;
            search_from = consumed;
        }

        if consumed > 0 {
            self.incomplete.drain(..consumed);
        }
        self.scanned = self.incomplete.len();

        complete_lines
    }

    /// Check if there's any incomplete data remaining in the buffer.
    pub fn has_incomplete(&self) -> bool {
        !self.incomplete.is_empty()
    }

    /// Get any remaining incomplete data.
    pub fn remaining(&self) -> &str {
        &self.incomplete
    }

    /// End of input: the unterminated remainder is discarded.
    pub fn finish(self) {
        if self.has_incomplete() {
            debug!(
                remaining_len = self.incomplete.len(),
                "Discarding unterminated line at end of stream"
            );
        }
    }
}
