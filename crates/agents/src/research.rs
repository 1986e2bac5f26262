//! Research agent - web search and source normalization.

use std::sync::Arc;

use calliope_backends::SearchBackend;
use calliope_common::SourceRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Maximum number of sources to return per topic
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Restrict results to one site ("{topic} site:{domain}")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_filter: Option<String>,
}

fn default_top_k() -> usize {
    5
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            site_filter: None,
        }
    }
}

/// Research agent: queries the search backend and normalizes whatever
/// shape comes back into [`SourceRecord`]s.
pub struct ResearchAgent {
    config: ResearchConfig,
    backend: Arc<dyn SearchBackend>,
}

impl ResearchAgent {
    pub fn new(backend: Arc<dyn SearchBackend>, config: ResearchConfig) -> Self {
        Self { config, backend }
    }

    pub fn top_k(&self) -> usize {
        self.config.top_k
    }

    fn build_query(&self, topic: &str) -> String {
        match &self.config.site_filter {
            Some(domain) => format!("{topic} site:{domain}"),
            None => topic.to_string(),
        }
    }

    /// Fetch and normalize sources for a topic.
    ///
    /// Never fails: a backend error degrades to a single synthetic record
    /// carrying the error text in its snippet.
    pub async fn fetch(&self, topic: &str) -> Vec<SourceRecord> {
        let query = self.build_query(topic);
        debug!(
            agent = "research",
            query = %query,
            top_k = self.config.top_k,
            "Fetching sources"
        );

        match self.backend.search(&query, self.config.top_k).await {
            Ok(raw) => normalize_results(topic, &raw, self.config.top_k),
            Err(e) => {
                warn!(
                    agent = "research",
                    error = %e,
                    "Search backend failed, degrading to a synthetic source"
                );
                vec![SourceRecord {
                    title: topic.to_string(),
                    snippet: format!("Error: {e}"),
                    url: String::new(),
                }]
            }
        }
    }
}

/// Normalize a raw search result into at most `top_k` records.
///
/// Ordered shape cases: a bare string becomes one topic-titled record; a
/// sequence is taken entry by entry in order; anything else coerces into
/// one snippet-only record.
fn normalize_results(topic: &str, raw: &Value, top_k: usize) -> Vec<SourceRecord> {
    let records: Vec<SourceRecord> = match raw {
        Value::String(s) => vec![SourceRecord {
            title: topic.to_string(),
            snippet: s.clone(),
            url: String::new(),
        }],
        Value::Array(items) => items.iter().map(normalize_entry).collect(),
        other => vec![SourceRecord::snippet_only(other.to_string())],
    };

    records.into_iter().take(top_k).collect()
}

fn normalize_entry(entry: &Value) -> SourceRecord {
    match entry {
        Value::String(s) => SourceRecord::snippet_only(s.clone()),
        Value::Object(map) => SourceRecord {
            title: string_field(map, &["title"]),
            snippet: string_field(map, &["snippet", "body"]),
            url: string_field(map, &["url", "link"]),
        },
        other => SourceRecord::snippet_only(other.to_string()),
    }
}

/// First present key wins; missing fields default to the empty string.
fn string_field(map: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}
