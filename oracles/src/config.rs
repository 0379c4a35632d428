//! Service endpoint and retry configuration
//!
//! ## Configuration Sources
//! Endpoints are loaded from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! Each service reads `<PREFIX>_BASE_URL`, `<PREFIX>_MODEL`, and optionally
//! `<PREFIX>_API_KEY` and `<PREFIX>_TEMPERATURE`, where the prefix is one of
//! `PREDICTOR`, `OPTIMIZER` or `ANALYZER`.

use std::time::Duration;

use crate::error::{OracleError, OracleResult};

/// Load variables from a `.env` file if one is present
///
/// Safe to call multiple times; variables already set are not overridden.
pub fn load_env() {
    let _ = dotenvy::dotenv();
}

/// Connection settings for one OpenAI-compatible chat service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEndpoint {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
}

impl ServiceEndpoint {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: model.into(),
            temperature,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Read the endpoint for `prefix` from the process environment
    pub fn from_env(prefix: &str, default_temperature: f32) -> OracleResult<Self> {
        Self::from_lookup(prefix, default_temperature, |key| std::env::var(key).ok())
    }

    /// Read the endpoint for `prefix`, falling back to `fallback` when the prefix is unset
    pub fn from_env_or(prefix: &str, fallback: &ServiceEndpoint) -> OracleResult<Self> {
        if std::env::var(format!("{prefix}_BASE_URL")).is_err() {
            return Ok(fallback.clone());
        }
        Self::from_env(prefix, fallback.temperature)
    }

    /// Read the endpoint through an arbitrary key lookup
    pub fn from_lookup<F>(prefix: &str, default_temperature: f32, lookup: F) -> OracleResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |suffix: &str| {
            let key = format!("{prefix}_{suffix}");
            lookup(&key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| OracleError::config(format!("missing required variable {key}")))
        };

        let base_url = required("BASE_URL")?;
        let model = required("MODEL")?;
        let api_key = lookup(&format!("{prefix}_API_KEY")).filter(|k| !k.trim().is_empty());

        let temperature = match lookup(&format!("{prefix}_TEMPERATURE")) {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .map_err(|e| OracleError::config(format!("invalid {prefix}_TEMPERATURE '{raw}': {e}")))?,
            None => default_temperature,
        };

        Ok(Self {
            base_url,
            api_key,
            model,
            temperature,
        })
    }

    /// Resolve the chat completions endpoint from the base URL
    pub fn chat_completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{base}/chat/completions")
        } else {
            format!("{base}/v1/chat/completions")
        }
    }
}

/// Bounded retry policy applied around every raw service call
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Deadline for a single attempt
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, call_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            call_timeout,
            ..Self::default()
        }
    }

    /// Policy without backoff delays (for tests)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            call_timeout: Duration::from_secs(5),
        }
    }

    /// Delay before the attempt following `attempt` (0-based), or None if it was the last
    pub fn backoff_for(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        Some(self.initial_backoff.saturating_mul(factor).min(self.max_backoff))
    }
}
