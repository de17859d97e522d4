use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{send_json, text_at};
use crate::provider::{LlmError, LlmProvider, Message, Role};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeProvider {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    /// Claude takes the system prompt as a top-level field, not a message.
    fn build_request_body(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let api_messages: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| json!({ "role": m.role.as_chat_role(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": api_messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        if !system.is_empty() {
            body["system"] = json!(system.join("\n\n"));
        }

        body
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = self.build_request_body(&messages, temperature, max_tokens);

        debug!(model = %self.model, "Claude request");

        let request = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01");
        let resp = send_json(request, &body).await?;
        text_at(&resp, "/content/0/text")
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ClaudeProvider {
        ClaudeProvider::new(reqwest::Client::new(), "sk-ant".into(), "claude-test".into())
    }

    #[test]
    fn system_prompt_moves_to_top_level() {
        let messages = vec![Message::system("You classify."), Message::user("Hello")];
        let body = provider().build_request_body(&messages, 0.3, 1024);

        assert_eq!(body["system"], "You classify.");
        let api_messages = body["messages"].as_array().unwrap();
        assert_eq!(api_messages.len(), 1);
        assert_eq!(api_messages[0]["role"], "user");
        assert_eq!(body["max_tokens"], 1024);
    }

    #[test]
    fn no_system_field_without_system_message() {
        let body = provider().build_request_body(&[Message::user("Hello")], 0.3, 1024);
        assert!(body.get("system").is_none());
    }
}
