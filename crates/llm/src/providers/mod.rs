pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use studybase_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let client = build_client(llm_config.timeout_secs)?;

    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = llm_config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Arc::new(openai::OpenAiProvider::new(
                client,
                api_key.clone(),
                llm_config.openai_model.clone(),
                base_url.trim_end_matches('/').to_string(),
            )))
        }
        "anthropic" | "claude" => {
            let api_key = llm_config
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Arc::new(claude::ClaudeProvider::new(
                client,
                api_key.clone(),
                llm_config.anthropic_model.clone(),
            )))
        }
        "gemini" => {
            let api_key = llm_config
                .gemini_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("GEMINI_API_KEY not set".into()))?;
            Ok(Arc::new(gemini::GeminiProvider::new(
                client,
                api_key.clone(),
                llm_config.gemini_model.clone(),
            )))
        }
        "ollama" => Ok(Arc::new(ollama::OllamaProvider::new(
            client,
            ollama_config.url.trim_end_matches('/').to_string(),
            ollama_config.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

fn build_client(timeout_secs: u32) -> Result<reqwest::Client, LlmError> {
    let mut builder = reqwest::Client::builder();
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(u64::from(timeout_secs)));
    }
    Ok(builder.build()?)
}

/// Send a JSON request and decode the JSON reply, turning any non-2xx
/// status into [`LlmError::ApiError`].
pub(crate) async fn send_json(request: reqwest::RequestBuilder, body: &Value) -> Result<Value, LlmError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::ApiError {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

/// Pull a string out of a response by JSON pointer.
pub(crate) fn text_at(resp: &Value, pointer: &str) -> Result<String, LlmError> {
    resp.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::ParseError(format!("missing {pointer}")))
}
