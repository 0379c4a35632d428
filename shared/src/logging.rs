//! Shared logging utilities for consistent tracing across the tuner
//!
//! The subscriber is installed once by the binary. Every event emitted by
//! the tuning loop carries the id of the run it belongs to, passed
//! explicitly through the `run_*` macros.

use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, info};

use crate::errors::{SharedError, SharedResult};
use crate::types::RunId;

/// Build the filter directive for the workspace crates at a base level
fn filter_directive(base_level: &str) -> String {
    format!("tuner={base_level},oracles={base_level},shared={base_level},reqwest=warn,hyper=warn")
}

/// Initialize tracing with stdout output and an optional log file
///
/// The log file receives the same events as the console, without ANSI
/// colouring, and is appended to if it already exists.
pub fn init_tracing_with_file(log_level: Option<&str>, log_file: Option<&Path>) -> SharedResult<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let base_level = log_level.unwrap_or("info");
    let level_filter = filter_directive(base_level);

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| SharedError::LoggingError {
                    message: format!("cannot create log directory {}: {e}", parent.display()),
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| SharedError::LoggingError {
                    message: format!("cannot open log file {}: {e}", path.display()),
                })?;
            Some(fmt::layer().with_ansi(false).with_target(true).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(&level_filter))
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SharedError::LoggingError { message: e.to_string() })?;

    Ok(())
}

/// Initialize tracing with stdout output only
pub fn init_tracing(log_level: Option<&str>) -> SharedResult<()> {
    init_tracing_with_file(log_level, None)
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Timestamp used in per-run file names
pub fn file_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Macro for run-aware info logging
#[macro_export]
macro_rules! run_info {
    ($run_id:expr, $($arg:tt)*) => {
        tracing::info!(
            run = %$run_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for run-aware warning logging
#[macro_export]
macro_rules! run_warn {
    ($run_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            run = %$run_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for run-aware debug logging
#[macro_export]
macro_rules! run_debug {
    ($run_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            run = %$run_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(run_id: &RunId, details: &str) {
    info!(
        run = %run_id,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(run_id: &RunId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        run = %run_id,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(run_id: &RunId, message: &str) {
    info!(
        run = %run_id,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_covers_workspace_crates() {
        let directive = filter_directive("debug");
        assert!(directive.contains("tuner=debug"));
        assert!(directive.contains("oracles=debug"));
        assert!(directive.contains("reqwest=warn"));
    }

    #[test]
    fn test_file_timestamp_shape() {
        let stamp = file_timestamp();
        assert_eq!(stamp.len(), "20240101_120000".len());
        assert_eq!(&stamp[8..9], "_");
    }

    #[test]
    fn test_macros_accept_run_id() {
        let run = RunId::new();
        run_info!(run, "info {}", 1);
        run_debug!(run, round = 2, "debug");
    }
}
