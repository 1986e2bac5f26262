use async_trait::async_trait;
use calliope_common::CalliopeError;
use calliope_common::Result;
use serde::Serialize;
use serde_json::Value;

use crate::generation::{GenerationBackend, GenerationParams};

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

#[derive(Serialize)]
struct HfRequest {
    inputs: String,
    parameters: HfParameters,
}

#[derive(Serialize)]
struct HfParameters {
    max_new_tokens: u32,
    temperature: f32,
}

/// Hosted-inference client (summarization or free generation task).
///
/// The response body is returned verbatim: depending on the model it is a
/// mapping, a one-element sequence, or a bare string.
pub struct HfInferenceClient {
    base_url: String,
    model: String,
    api_token: String,
    http_client: reqwest::Client,
}

impl HfInferenceClient {
    pub fn new(base_url: Option<String>, model: String, api_token: String) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_token,
            http_client: reqwest::Client::new(),
        }
    }

    /// Build the request body for testing purposes.
    #[cfg(test)]
    fn build_request_body(&self, input: &str, params: &GenerationParams) -> HfRequest {
        HfRequest {
            inputs: input.to_string(),
            parameters: HfParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
            },
        }
    }
}

#[async_trait]
impl GenerationBackend for HfInferenceClient {
    async fn generate(&self, input: &str, params: &GenerationParams) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, self.model);
        let body = HfRequest {
            inputs: input.to_string(),
            parameters: HfParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CalliopeError::Backend(format!("inference request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(CalliopeError::Backend(format!(
                "inference API error {status}: {body_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CalliopeError::Parse(format!("failed to parse inference response: {e}")))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
