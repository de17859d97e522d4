use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{send_json, text_at};
use crate::provider::{LlmError, LlmProvider, Message};

/// OpenAI chat completions, or any server speaking the same API.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }

    fn build_request_body(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
        let api_messages: Vec<Value> = messages
            .iter()
            .map(|m| json!({ "role": m.role.as_chat_role(), "content": m.content }))
            .collect();

        json!({
            "model": self.model,
            "messages": api_messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&messages, temperature, max_tokens);

        debug!(url = %url, model = %self.model, "OpenAI request");

        let request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key));
        let resp = send_json(request, &body).await?;
        text_at(&resp, "/choices/0/message/content")
    }

    fn name(&self) -> &str {
        "openai"
    }
}
