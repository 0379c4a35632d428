//! Text-generation oracles used by the prompt tuner
//!
//! This library wraps three OpenAI-compatible chat services behind narrow
//! traits: a predictor that produces diagnosis lists, an optimizer that
//! rewrites the prompt's rules section, and an analyzer that explains
//! per-case differences. Every call goes through a bounded retry policy.

pub mod config;
pub mod error;
pub mod prompts;
pub mod retry;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use config::{load_env, RetryPolicy, ServiceEndpoint};
pub use error::{OracleError, OracleResult};
pub use services::*;
pub use traits::*;
pub use types::{ApiFailure, ChatMessage};
