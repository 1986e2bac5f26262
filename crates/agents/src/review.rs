//! Review agent - draft critique, heuristic or delegated.

use std::sync::Arc;

use calliope_backends::{GenerationBackend, GenerationParams, extract_generated_text};
use calliope_common::{REPORT_SECTIONS, Result, Review, SourceRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Generic improvement suggestions appended to every heuristic review.
const GENERIC_SUGGESTIONS: [&str; 3] = [
    "Strengthen the academic tone.",
    "Add concrete examples to illustrate the ethical risks discussed.",
    "Connect the practical applications explicitly to the challenges raised.",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    /// Pure local checks, no backend call
    #[default]
    Heuristic,
    /// Critique delegated to the generation backend, heuristic fallback
    Delegated,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReviewThresholds {
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default = "default_max_sentence_tokens")]
    pub max_sentence_tokens: usize,
}

fn default_min_words() -> usize {
    350
}

fn default_max_words() -> usize {
    700
}

fn default_max_sentence_tokens() -> usize {
    80
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            max_words: default_max_words(),
            max_sentence_tokens: default_max_sentence_tokens(),
        }
    }
}

/// Review agent: critiques a draft either with deterministic local checks
/// or by delegating to the generation backend.
pub struct ReviewAgent {
    mode: ReviewMode,
    thresholds: ReviewThresholds,
    backend: Option<Arc<dyn GenerationBackend>>,
    params: GenerationParams,
}

impl ReviewAgent {
    pub fn heuristic(thresholds: ReviewThresholds) -> Self {
        Self {
            mode: ReviewMode::Heuristic,
            thresholds,
            backend: None,
            params: GenerationParams::default(),
        }
    }

    pub fn delegated(
        backend: Arc<dyn GenerationBackend>,
        params: GenerationParams,
        thresholds: ReviewThresholds,
    ) -> Self {
        Self {
            mode: ReviewMode::Delegated,
            thresholds,
            backend: Some(backend),
            params,
        }
    }

    pub fn mode(&self) -> ReviewMode {
        self.mode
    }

    /// Critique a draft.
    ///
    /// Never fails: in delegated mode any backend error falls back to the
    /// heuristic output.
    pub async fn review(&self, draft: &str, sources: &[SourceRecord]) -> Review {
        match self.mode {
            ReviewMode::Heuristic => Review::Text(self.heuristic_review(draft)),
            ReviewMode::Delegated => match self.delegated_review(draft, sources).await {
                Ok(text) => Review::Text(text),
                Err(e) => {
                    warn!(
                        agent = "review",
                        error = %e,
                        "Delegated review failed, falling back to heuristic checks"
                    );
                    Review::Text(self.heuristic_review(draft))
                }
            },
        }
    }

    /// Deterministic local critique: same draft in, same bullets out.
    fn heuristic_review(&self, draft: &str) -> String {
        let t = &self.thresholds;
        let mut bullets = Vec::new();

        let lower = draft.to_lowercase();
        for section in REPORT_SECTIONS {
            if !lower.contains(&section.to_lowercase()) {
                bullets.push(format!("Missing section: {section}."));
            }
        }

        let words = word_count(draft);
        if words < t.min_words {
            bullets.push(format!(
                "The draft is too short ({words} words; aim for at least {}).",
                t.min_words
            ));
        } else if words > t.max_words {
            bullets.push(format!(
                "The draft is too long ({words} words; keep it under {}).",
                t.max_words
            ));
        } else {
            bullets.push(format!("The draft has adequate length ({words} words)."));
        }

        if !has_citations(draft) {
            bullets.push("Missing citation: no source markers or URLs found.".to_string());
        }

        let overlong = overlong_sentences(draft, t.max_sentence_tokens);
        if overlong > 0 {
            bullets.push(format!(
                "{overlong} sentence(s) exceed {} tokens; consider splitting them.",
                t.max_sentence_tokens
            ));
        }

        for suggestion in GENERIC_SUGGESTIONS {
            bullets.push(suggestion.to_string());
        }

        bullets
            .iter()
            .map(|b| format!("• {b}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn delegated_review(&self, draft: &str, sources: &[SourceRecord]) -> Result<String> {
        let backend = self.backend.as_ref().ok_or_else(|| {
            calliope_common::CalliopeError::Config(
                "delegated review requires a generation backend".to_string(),
            )
        })?;

        let prompt = build_review_prompt(draft, sources);
        debug!(
            agent = "review",
            model = backend.model_name(),
            "Delegating review to generation backend"
        );

        let raw = backend.generate(&prompt, &self.params).await?;
        Ok(extract_generated_text(&raw))
    }
}

fn build_review_prompt(draft: &str, sources: &[SourceRecord]) -> String {
    let mut prompt = String::from(
        "You are reviewing a draft research report. Critique its coherence, \
         veracity, and style, and suggest concrete improvements as a bullet \
         list.\n\nDraft:\n\n",
    );
    prompt.push_str(draft);

    if !sources.is_empty() {
        prompt.push_str("\n\nThe draft was written from these sources:\n");
        for (i, source) in sources.iter().enumerate() {
            prompt.push_str(&format!("{}. {} ({})\n", i + 1, source.title, source.url));
        }
    }

    prompt
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// True when the text carries `[n]` markers or URLs.
fn has_citations(text: &str) -> bool {
    if text.contains("http://") || text.contains("https://") {
        return true;
    }

    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close) => {
                let inner = &after[..close];
                if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
                    return true;
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    false
}

/// Count sentences whose whitespace token count exceeds `max_tokens`.
fn overlong_sentences(text: &str, max_tokens: usize) -> usize {
    text.split(['.', '!', '?'])
        .filter(|sentence| sentence.split_whitespace().count() > max_tokens)
        .count()
}
