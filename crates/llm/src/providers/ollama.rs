use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{send_json, text_at};
use crate::provider::{LlmError, LlmProvider, Message};

pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(client: reqwest::Client, url: String, model: String) -> Self {
        Self { client, url, model }
    }

    // Ollama has no max_tokens on /api/chat; num_predict is the equivalent.
    fn build_request_body(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
        let api_messages: Vec<Value> = messages
            .iter()
            .map(|m| json!({ "role": m.role.as_chat_role(), "content": m.content }))
            .collect();

        json!({
            "model": self.model,
            "messages": api_messages,
            "stream": false,
            "format": "json",
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            },
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.url);
        let body = self.build_request_body(&messages, temperature, max_tokens);

        debug!(url = %url, model = %self.model, "Ollama request");

        let resp = send_json(self.client.post(&url), &body).await?;
        text_at(&resp, "/message/content")
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
