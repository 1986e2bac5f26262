//! Configuration for the pipeline coordinator.
//!
//! # Security
//!
//! - Config file permission validation on Unix systems
//! - Rejects world-readable files containing API keys
//! - Warns about API keys stored in config files

use calliope_agents::{ResearchConfig, ReviewMode, ReviewThresholds};
use calliope_backends::{GenerationConfig, SearchConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Main pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Generation backend (drafting, revision, delegated review)
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Search backend
    #[serde(default)]
    pub search: SearchConfig,

    /// Source fetching (top_k, site filter)
    #[serde(default)]
    pub research: ResearchConfig,

    /// Review stage mode and thresholds
    #[serde(default)]
    pub review: ReviewConfig,

    /// How the review feeds into the final document
    #[serde(default)]
    pub finalize: FinalizePolicy,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default)]
    pub mode: ReviewMode,

    #[serde(default)]
    pub thresholds: ReviewThresholds,
}

/// How review feedback reaches the final document.
///
/// The source variants disagree on this, so it is a configuration choice
/// rather than a fixed policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalizePolicy {
    /// Ask the backend to rewrite the draft with the review incorporated,
    /// appending the review verbatim if that call fails
    #[default]
    Regenerate,

    /// Append the review verbatim as an adjustments section, no backend call
    Append,
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    ///
    /// On Unix systems this validates that the file is a regular file, is
    /// not world-writable, and is not world-readable when it contains an
    /// API key.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        validate_config_file_permissions(path)?;

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;

        if config.generation.api_key.is_some() {
            warn!(
                "API key found in config file '{}'. For better security, \
                 use environment variables instead (HF_TOKEN, OPENAI_API_KEY).",
                path.display()
            );
        }

        Ok(config)
    }

    /// Load configuration from a TOML file without permission checks.
    ///
    /// Use this only for testing or when you've already validated the file.
    pub fn from_file_unchecked(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Validate config file permissions on Unix systems.
///
/// Requirements:
/// - File must be a regular file (not symlink, directory, etc.)
/// - File must not be world-writable (mode & 0o002 == 0)
/// - If file contains API key patterns, must not be world-readable
#[cfg(unix)]
fn validate_config_file_permissions(path: &std::path::Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if !metadata.is_file() {
        anyhow::bail!(
            "Config path '{}' is not a regular file. Symlinks and directories are not allowed.",
            path.display()
        );
    }

    let mode = metadata.permissions().mode();
    let permission_bits = mode & 0o777;

    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {:04o}). \
             This is a security risk. Fix with: chmod o-w {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    let content = std::fs::read_to_string(path).unwrap_or_default();
    let has_api_key =
        content.contains("api_key") && (content.contains("hf_") || content.contains("key ="));

    if has_api_key && permission_bits & 0o004 != 0 {
        anyhow::bail!(
            "Config file '{}' contains an API key but is world-readable (mode {:04o}). \
             This is a security risk. Fix with: chmod 600 {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    if has_api_key && permission_bits & 0o040 != 0 {
        warn!(
            "Config file '{}' contains an API key and is group-readable (mode {:04o}). \
             Consider restricting access with: chmod 600 {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_CONFIG: &str = r#"
finalize = "append"

[generation]
provider = "hf-inference"
model = "facebook/bart-large-cnn"
api_key = "hf_test"

[search]
api_url = "http://localhost:9200/search"

[research]
top_k = 3
site_filter = "arxiv.org"

[review]
mode = "delegated"

[review.thresholds]
min_words = 300
max_words = 800
max_sentence_tokens = 60
"#;

    #[test]
    fn deserialize_full_config() {
        let config: PipelineConfig = toml::from_str(TOML_CONFIG).unwrap();
        assert_eq!(config.generation.provider, "hf-inference");
        assert_eq!(config.generation.api_key.as_deref(), Some("hf_test"));
        assert_eq!(
            config.search.api_url.as_deref(),
            Some("http://localhost:9200/search")
        );
        assert_eq!(config.research.top_k, 3);
        assert_eq!(config.research.site_filter.as_deref(), Some("arxiv.org"));
        assert_eq!(config.review.mode, ReviewMode::Delegated);
        assert_eq!(config.review.thresholds.min_words, 300);
        assert_eq!(config.finalize, FinalizePolicy::Append);
    }

    #[test]
    fn deserialize_minimal_config_uses_defaults() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config.generation.provider, "hf-inference");
        assert_eq!(config.generation.model, "facebook/bart-large-cnn");
        assert_eq!(config.research.top_k, 5);
        assert_eq!(config.review.mode, ReviewMode::Heuristic);
        assert_eq!(config.review.thresholds.min_words, 350);
        assert_eq!(config.review.thresholds.max_words, 700);
        assert_eq!(config.finalize, FinalizePolicy::Regenerate);
    }

    #[test]
    fn finalize_policy_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FinalizePolicy::Regenerate).unwrap(),
            "\"regenerate\""
        );
        assert_eq!(
            serde_json::to_string(&FinalizePolicy::Append).unwrap(),
            "\"append\""
        );
    }
}
