use async_trait::async_trait;
use calliope_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sampling parameters for one generation round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 512,
            temperature: 0.7,
        }
    }
}

/// A hosted text-generation backend.
///
/// `generate` returns the backend's raw response shape (a mapping, a
/// sequence, or a bare string); callers normalize it with
/// [`crate::extract_generated_text`].
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, input: &str, params: &GenerationParams) -> Result<Value>;
    fn model_name(&self) -> &str;
}

#[async_trait]
impl GenerationBackend for Box<dyn GenerationBackend> {
    async fn generate(&self, input: &str, params: &GenerationParams) -> Result<Value> {
        (**self).generate(input, params).await
    }
    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
