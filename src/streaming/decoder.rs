//! Incremental UTF-8 decoding of transport chunks
//!
//! Transports deliver bytes with no regard for character boundaries, so a
//! multi-byte character may arrive in two (or more) chunks. `Utf8Decoder`
//! holds back the unfinished tail of each chunk until the rest arrives.

use std::borrow::Cow;

use tracing::debug;

/// Stateful UTF-8 decoder for a single response body.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Bytes of a multi-byte sequence that is not yet complete (at most 3)
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder with no carried bytes
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Decode the next chunk, returning all text that is complete so far.
    ///
    /// Byte sequences that can never become valid UTF-8 are replaced with
    /// U+FFFD; a valid sequence that is merely cut short is carried over.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let combined = self.combine_with_pending(chunk);
        let mut input: &[u8] = &combined;

        let mut text = String::with_capacity(input.len());

        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    // valid_up_to() guarantees this prefix is UTF-8
                    text.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match err.error_len() {
                        Some(invalid_len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[invalid_len..];
                        }
                        None => {
                            self.pending.extend_from_slice(rest);
                            break;
                        }
                    }
                }
            }
        }

        text
    }

    /// Prepend the bytes carried from the previous chunk, leaving none pending
    fn combine_with_pending<'a>(&mut self, chunk: &'a [u8]) -> Cow<'a, [u8]> {
        if self.pending.is_empty() {
            return Cow::Borrowed(chunk);
        }
        let mut combined = std::mem::take(&mut self.pending);
        combined.extend_from_slice(chunk);
        Cow::Owned(combined)
    }

    /// Number of bytes currently carried over to the next chunk
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// End of input: a carried partial sequence is dropped.
    pub fn finish(self) {
        if !self.pending.is_empty() {
            debug!(
                dropped_bytes = self.pending.len(),
                "Dropping truncated UTF-8 sequence at end of stream"
            );
        }
    }
}
