//! Oracle trait definitions for dependency injection

use async_trait::async_trait;

use shared::{AnalysisRequest, GenerationRequest};
use crate::error::OracleResult;
use crate::types::{ApiFailure, ChatMessage};

/// Raw chat-completions transport; one call is one HTTP round trip
#[mockall::automock]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send messages and return the first choice's content
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ApiFailure>;
}

/// Produces a diagnosis response for one case
#[mockall::automock]
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Run `prompt` against the case payload; returns the raw response text
    async fn predict(&self, prompt: &str, input: &serde_json::Value) -> OracleResult<String>;
}

/// Produces a candidate prompt for the next round
#[mockall::automock]
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> OracleResult<String>;
}

/// Explains the differences between a prediction and its ground truth
#[mockall::automock]
#[async_trait]
pub trait CaseAnalyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> OracleResult<String>;
}
