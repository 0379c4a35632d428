//! OpenAI-compatible chat-completions transport over reqwest

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::ServiceEndpoint;
use crate::traits::ChatTransport;
use crate::types::{ApiFailure, ChatMessage};

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Real chat client bound to one service endpoint
pub struct RealChatClient {
    http: reqwest::Client,
    endpoint: ServiceEndpoint,
    url: String,
}

impl RealChatClient {
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        let url = endpoint.chat_completions_url();
        Self {
            http: reqwest::Client::new(),
            endpoint,
            url,
        }
    }
}

#[async_trait]
impl ChatTransport for RealChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ApiFailure> {
        let request_body = serde_json::json!({
            "model": self.endpoint.model,
            "messages": messages,
            "temperature": self.endpoint.temperature,
            "stream": false
        });

        let mut request = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request_body);
        if let Some(key) = &self.endpoint.api_key {
            request = request.bearer_auth(key);
        }

        let request_start = std::time::Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| ApiFailure::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiFailure::from_status(status.as_u16(), detail));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiFailure::MalformedBody(format!("failed to parse response: {e}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ApiFailure::MalformedBody("no content in response".to_string()))?;

        debug!(
            model = %self.endpoint.model,
            elapsed_ms = request_start.elapsed().as_millis() as u64,
            "chat completion received"
        );

        Ok(content.trim().to_string())
    }
}
