use std::sync::Arc;

use async_trait::async_trait;
use calliope_common::{CalliopeError, Result};
use serde::{Deserialize, Serialize};

use crate::generation::{GenerationBackend, GenerationParams};
use crate::hf::HfInferenceClient;
use crate::openai_compat::OpenAiCompatClient;
use crate::retry::{RetryConfig, RetryingGeneration};
use crate::search::{DuckDuckGoClient, SearchBackend};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider type: "hf-inference" or "openai"
    pub provider: String,

    /// Model name
    pub model: String,

    /// API token. If not set, read from the environment:
    /// HF_TOKEN for hf-inference, OPENAI_API_KEY for openai.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API endpoint override (for self-hosted or OpenAI-compatible endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_max_new_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_concurrent() -> usize {
    2
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "hf-inference".into(),
            model: "facebook/bart-large-cnn".into(),
            api_key: None,
            api_url: None,
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            max_concurrent_requests: default_max_concurrent(),
            retry: RetryConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Resolve the API token from config or environment.
    ///
    /// Priority: explicit `api_key`, then the provider's environment
    /// variable (HF_TOKEN for hf-inference, OPENAI_API_KEY for openai).
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        let env_var = match self.provider.as_str() {
            "hf-inference" => "HF_TOKEN",
            "openai" => "OPENAI_API_KEY",
            _ => return None,
        };

        std::env::var(env_var).ok()
    }

    /// Sampling parameters carried into every generation call.
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Caps concurrent in-flight requests against a shared generation backend.
pub struct SemaphoredGeneration {
    inner: Arc<dyn GenerationBackend>,
    semaphore: Arc<tokio::sync::Semaphore>,
}

impl SemaphoredGeneration {
    pub fn new(inner: Arc<dyn GenerationBackend>, max_concurrent: usize) -> Self {
        Self {
            inner,
            semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent)),
        }
    }
}

#[async_trait]
impl GenerationBackend for SemaphoredGeneration {
    async fn generate(&self, input: &str, params: &GenerationParams) -> Result<serde_json::Value> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| CalliopeError::Backend(format!("semaphore acquire failed: {e}")))?;
        self.inner.generate(input, params).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Build the generation backend described by `config`.
///
/// Missing credentials and unknown providers are configuration errors,
/// raised here so a pipeline never starts with an unusable backend.
pub fn build_generation_backend(config: &GenerationConfig) -> Result<Arc<dyn GenerationBackend>> {
    let base_backend: Box<dyn GenerationBackend> = match config.provider.as_str() {
        "hf-inference" => {
            let api_token = config.resolve_api_key().ok_or_else(|| {
                CalliopeError::Config(
                    "hf-inference requires an API token (api_key or HF_TOKEN)".to_string(),
                )
            })?;
            Box::new(HfInferenceClient::new(
                config.api_url.clone(),
                config.model.clone(),
                api_token,
            ))
        }
        "openai" => Box::new(OpenAiCompatClient::new(
            config.api_url.clone(),
            config.model.clone(),
            config.resolve_api_key(),
        )),
        other => {
            return Err(CalliopeError::Config(format!(
                "Unknown generation provider: {other}"
            )));
        }
    };

    let retrying: Box<dyn GenerationBackend> =
        Box::new(RetryingGeneration::new(base_backend, config.retry.clone()));

    let semaphored = SemaphoredGeneration::new(Arc::from(retrying), config.max_concurrent_requests);

    Ok(Arc::new(semaphored))
}

/// Build the search backend described by `config`.
pub fn build_search_backend(config: &SearchConfig) -> Result<Arc<dyn SearchBackend>> {
    Ok(Arc::new(DuckDuckGoClient::new(config.api_url.clone())))
}
