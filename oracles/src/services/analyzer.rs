//! Case analyzer backed by a chat transport

use async_trait::async_trait;

use shared::AnalysisRequest;
use crate::config::RetryPolicy;
use crate::error::OracleResult;
use crate::prompts::analyzer_messages;
use crate::retry::call_with_retries;
use crate::traits::{CaseAnalyzer, ChatTransport};

pub struct ChatAnalyzer<T: ChatTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: ChatTransport> ChatAnalyzer<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }
}

#[async_trait]
impl<T: ChatTransport> CaseAnalyzer for ChatAnalyzer<T> {
    async fn analyze(&self, request: &AnalysisRequest) -> OracleResult<String> {
        let messages = analyzer_messages(request)?;
        let transport = &self.transport;
        let messages = messages.as_slice();
        call_with_retries(&self.policy, "analyze", move || transport.complete(messages)).await
    }
}
