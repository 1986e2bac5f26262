use async_trait::async_trait;
use calliope_common::{CalliopeError, Result};
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.duckduckgo.com/";

/// A web-search backend.
///
/// `search` returns whatever shape the backend produced: a bare string, a
/// sequence of strings, or a sequence of mappings with backend-specific
/// key names. Normalization into [`calliope_common::SourceRecord`] is the
/// research agent's job, not the client's.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Value>;
    fn name(&self) -> &str;
}

#[async_trait]
impl SearchBackend for Box<dyn SearchBackend> {
    async fn search(&self, query: &str, max_results: usize) -> Result<Value> {
        (**self).search(query, max_results).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

pub struct DuckDuckGoClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl DuckDuckGoClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Value> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("q", query.to_string()),
                ("format", "json".to_string()),
                ("no_html", "1".to_string()),
                ("max_results", max_results.to_string()),
            ])
            .send()
            .await
            .map_err(|e| CalliopeError::Backend(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(CalliopeError::Backend(format!(
                "search API error {status}: {body_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CalliopeError::Parse(format!("failed to parse search response: {e}")))
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}
