//! Prompt generator backed by a chat transport

use async_trait::async_trait;

use shared::GenerationRequest;
use crate::config::RetryPolicy;
use crate::error::OracleResult;
use crate::prompts::optimizer_messages;
use crate::retry::call_with_retries;
use crate::traits::{ChatTransport, PromptGenerator};

/// Default sampling temperature for the optimizer and analyzer services
pub const OPTIMIZER_TEMPERATURE: f32 = 0.7;

pub struct ChatPromptGenerator<T: ChatTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: ChatTransport> ChatPromptGenerator<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }
}

#[async_trait]
impl<T: ChatTransport> PromptGenerator for ChatPromptGenerator<T> {
    async fn generate(&self, request: &GenerationRequest) -> OracleResult<String> {
        let messages = optimizer_messages(request)?;
        let transport = &self.transport;
        let messages = messages.as_slice();
        call_with_retries(&self.policy, "generate", move || transport.complete(messages)).await
    }
}
