//! Writing agent - report drafting and revision.

use std::sync::Arc;

use calliope_backends::{GenerationBackend, GenerationParams, extract_generated_text};
use calliope_common::{REPORT_SECTIONS, Result, SourceRecord};
use tracing::{debug, warn};

const TARGET_WORDS_MIN: usize = 400;
const TARGET_WORDS_MAX: usize = 600;

/// Writing agent: builds deterministic prompts and delegates text
/// production to the generation backend.
pub struct WritingAgent {
    backend: Arc<dyn GenerationBackend>,
    params: GenerationParams,
}

impl WritingAgent {
    pub fn new(backend: Arc<dyn GenerationBackend>, params: GenerationParams) -> Self {
        Self { backend, params }
    }

    /// Produce a first draft for a topic.
    ///
    /// Never fails: a backend error degrades into a diagnostic draft
    /// prefixed "Error", and the pipeline continues with it.
    pub async fn draft(&self, topic: &str, sources: &[SourceRecord]) -> String {
        let prompt = build_draft_prompt(topic, sources);
        debug!(
            agent = "writing",
            model = self.backend.model_name(),
            source_count = sources.len(),
            "Drafting report"
        );

        match self.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    agent = "writing",
                    error = %e,
                    "Draft generation failed, degrading to a diagnostic draft"
                );
                format!("Error: draft generation failed: {e}")
            }
        }
    }

    /// Regenerate the draft with the review feedback incorporated.
    ///
    /// Failure propagates so the coordinator can fall back to appending
    /// the review verbatim.
    pub async fn revise(&self, topic: &str, draft: &str, review: &str) -> Result<String> {
        let prompt = build_revision_prompt(topic, draft, review);
        debug!(
            agent = "writing",
            model = self.backend.model_name(),
            "Revising draft with review feedback"
        );
        self.generate(&prompt).await
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let raw = self.backend.generate(prompt, &self.params).await?;
        Ok(extract_generated_text(&raw))
    }
}

/// Deterministic drafting prompt: topic header, enumerated sources, the
/// fixed section structure, and target length guidance.
fn build_draft_prompt(topic: &str, sources: &[SourceRecord]) -> String {
    let mut prompt = format!("Topic: {topic}\n\n");

    if sources.is_empty() {
        prompt.push_str(
            "No sources are available for this topic. Acknowledge that in the \
             introduction and write from general knowledge.\n",
        );
    } else {
        prompt.push_str("Sources:\n");
        for (i, source) in sources.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. {} | {} | {}\n",
                i + 1,
                source.title,
                source.snippet,
                source.url
            ));
        }
    }

    prompt.push_str("\nWrite a Markdown research report with these sections: ");
    prompt.push_str(&REPORT_SECTIONS.join(", "));
    prompt.push_str(&format!(
        ".\nTarget length: {TARGET_WORDS_MIN}-{TARGET_WORDS_MAX} words.\n"
    ));
    prompt
}

fn build_revision_prompt(topic: &str, draft: &str, review: &str) -> String {
    format!(
        "Topic: {topic}\n\nHere is a draft report:\n\n{draft}\n\n\
         A reviewer made these observations:\n\n{review}\n\n\
         Rewrite the report incorporating the reviewer's suggestions. \
         Keep the same section structure and a length of \
         {TARGET_WORDS_MIN}-{TARGET_WORDS_MAX} words.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use calliope_common::CalliopeError;
    use serde_json::{Value, json};

    struct StaticGeneration {
        value: Value,
    }

    #[async_trait]
    impl GenerationBackend for StaticGeneration {
        async fn generate(&self, _input: &str, _params: &GenerationParams) -> Result<Value> {
            Ok(self.value.clone())
        }
        fn model_name(&self) -> &str {
            "static"
        }
    }

    struct FailingGeneration;

    #[async_trait]
    impl GenerationBackend for FailingGeneration {
        async fn generate(&self, _input: &str, _params: &GenerationParams) -> Result<Value> {
            Err(CalliopeError::Backend("model unavailable".to_string()))
        }
        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn writer(value: Value) -> WritingAgent {
        WritingAgent::new(
            Arc::new(StaticGeneration { value }),
            GenerationParams::default(),
        )
    }

    #[tokio::test]
    async fn draft_extracts_summary_text() {
        let agent = writer(json!({"summary_text": "the report body"}));
        let draft = agent.draft("topic", &[]).await;
        assert_eq!(draft, "the report body");
    }

    #[tokio::test]
    async fn draft_extracts_wrapped_generated_text() {
        let agent = writer(json!([{"generated_text": "wrapped body"}]));
        let draft = agent.draft("topic", &[]).await;
        assert_eq!(draft, "wrapped body");
    }

    #[tokio::test]
    async fn draft_failure_degrades_to_error_prefixed_text() {
        let agent = WritingAgent::new(Arc::new(FailingGeneration), GenerationParams::default());
        let draft = agent.draft("topic", &[]).await;
        assert!(draft.starts_with("Error"));
        assert!(draft.contains("model unavailable"));
    }

    #[tokio::test]
    async fn revise_failure_propagates() {
        let agent = WritingAgent::new(Arc::new(FailingGeneration), GenerationParams::default());
        let result = agent.revise("topic", "draft", "review").await;
        assert!(result.is_err());
    }

    #[test]
    fn draft_prompt_is_deterministic() {
        let sources = vec![SourceRecord::new("A", "foo", "u1")];
        let a = build_draft_prompt("bias in LLMs", &sources);
        let b = build_draft_prompt("bias in LLMs", &sources);
        assert_eq!(a, b);
    }

    #[test]
    fn draft_prompt_enumerates_sources_and_sections() {
        let sources = vec![
            SourceRecord::new("A", "foo", "u1"),
            SourceRecord::new("B", "bar", "u2"),
        ];
        let prompt = build_draft_prompt("bias in LLMs", &sources);

        assert!(prompt.starts_with("Topic: bias in LLMs"));
        assert!(prompt.contains("1. A | foo | u1"));
        assert!(prompt.contains("2. B | bar | u2"));
        for section in REPORT_SECTIONS {
            assert!(prompt.contains(section));
        }
        assert!(prompt.contains("400-600 words"));
    }

    #[test]
    fn draft_prompt_acknowledges_missing_sources() {
        let prompt = build_draft_prompt("bias in LLMs", &[]);
        assert!(prompt.contains("No sources are available"));
    }

    #[test]
    fn revision_prompt_embeds_draft_and_review() {
        let prompt = build_revision_prompt("t", "the draft", "the review");
        assert!(prompt.contains("the draft"));
        assert!(prompt.contains("the review"));
        assert!(prompt.contains("incorporating"));
    }
}
