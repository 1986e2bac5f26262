use async_trait::async_trait;
use calliope_common::CalliopeError;
use calliope_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generation::{GenerationBackend, GenerationParams};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for OpenAI-compatible chat-completions endpoints (including
/// local Ollama).
///
/// The chat-completions shape is this client's own wire contract, so it
/// unwraps the first choice itself and hands the content back as a bare
/// string value.
pub struct OpenAiCompatClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(base_url: Option<String>, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn build_body(&self, input: &str, params: &GenerationParams) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: input.to_string(),
            }],
            temperature: Some(params.temperature),
            max_tokens: Some(params.max_new_tokens),
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiCompatClient {
    async fn generate(&self, input: &str, params: &GenerationParams) -> Result<Value> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_body(input, params);

        let mut http_req = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            http_req = http_req.bearer_auth(key);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| CalliopeError::Backend(format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(CalliopeError::Backend(format!(
                "chat API error {status}: {body_text}"
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| CalliopeError::Parse(format!("failed to parse chat response: {e}")))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CalliopeError::Backend("no choices in chat response".to_string()))?;

        Ok(Value::String(choice.message.content))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
