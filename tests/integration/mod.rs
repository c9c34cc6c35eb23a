//! Integration tests for the Hikmah client
//!
//! These tests drive the real HTTP transport against a mock answer service
//! and verify the complete request/stream/event flow.

mod sessions;
