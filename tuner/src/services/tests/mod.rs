//! Tests for the tuner's file-backed services

pub mod case_store;
