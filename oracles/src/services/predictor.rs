//! Predictor backed by a chat transport

use async_trait::async_trait;

use crate::config::RetryPolicy;
use crate::error::OracleResult;
use crate::prompts::predictor_messages;
use crate::retry::call_with_retries;
use crate::traits::{ChatTransport, Predictor};

/// Default sampling temperature for the predictor service
pub const PREDICTOR_TEMPERATURE: f32 = 0.3;

pub struct ChatPredictor<T: ChatTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: ChatTransport> ChatPredictor<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }
}

#[async_trait]
impl<T: ChatTransport> Predictor for ChatPredictor<T> {
    async fn predict(&self, prompt: &str, input: &serde_json::Value) -> OracleResult<String> {
        let messages = predictor_messages(prompt, input)?;
        let transport = &self.transport;
        let messages = messages.as_slice();
        call_with_retries(&self.policy, "predict", move || transport.complete(messages)).await
    }
}
