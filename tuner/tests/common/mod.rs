//! Common test utilities and infrastructure
//!
//! This module provides shared fixtures and builders used across the
//! tuner integration suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{TestHelpers, TunerBuilder};
