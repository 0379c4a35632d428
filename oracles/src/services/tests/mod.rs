//! Tests for the chat-backed oracle services
//!
//! The transport is mocked so these cover message construction and the
//! retry behaviour each service wraps around it.
