//! Data model for a single pipeline run.
//!
//! Every entity here is append-only: once a stage has produced its value,
//! later stages only read it. Regenerating a draft creates a new value.

use serde::{Deserialize, Serialize};

/// Section names every report draft is asked to contain.
pub const REPORT_SECTIONS: [&str; 4] = [
    "Introduction",
    "Key Findings",
    "Ethical and Technical Challenges",
    "Conclusion",
];

/// A normalized search result.
///
/// After normalization all three fields are present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

impl SourceRecord {
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url: url.into(),
        }
    }

    /// A record carrying only snippet text, title and url left empty.
    pub fn snippet_only(snippet: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            snippet: snippet.into(),
            url: String::new(),
        }
    }
}

/// Critique produced by the review stage.
///
/// Free text is the common case (a bullet list of observations and
/// suggestions); some callers score drafts programmatically instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Review {
    Text(String),
    Scored(ReviewScores),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewScores {
    pub coherence: f32,
    pub veracity: f32,
    pub style: f32,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl Review {
    /// Render the review as free text, for prompt embedding and for the
    /// adjustments appendix of a final report.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Scored(scores) => {
                let mut lines = vec![
                    format!("coherence: {:.1}", scores.coherence),
                    format!("veracity: {:.1}", scores.veracity),
                    format!("style: {:.1}", scores.style),
                ];
                for suggestion in &scores.suggestions {
                    lines.push(format!("- {suggestion}"));
                }
                lines.join("\n")
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Scored(scores) => scores.suggestions.is_empty(),
        }
    }
}

/// Everything one pipeline run produced, assembled by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Unique run ID
    pub run_id: String,

    /// The topic the run was invoked with
    pub topic: String,

    /// Normalized sources, in backend order
    pub sources: Vec<SourceRecord>,

    /// First draft, exactly as the drafting stage returned it
    pub draft: String,

    /// Critique of the first draft
    pub review: Review,

    /// Final document after incorporating (or appending) the review
    pub final_report: String,
}

impl PipelineResult {
    pub fn new(
        topic: impl Into<String>,
        sources: Vec<SourceRecord>,
        draft: impl Into<String>,
        review: Review,
        final_report: impl Into<String>,
    ) -> Self {
        Self {
            run_id: format!("run_{}", uuid::Uuid::new_v4()),
            topic: topic.into(),
            sources,
            draft: draft.into(),
            review,
            final_report: final_report.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_record_serialization_roundtrip() {
        let record = SourceRecord::new("A title", "Some snippet text", "https://example.com");
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: SourceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, record);
    }

    #[test]
    fn snippet_only_leaves_title_and_url_empty() {
        let record = SourceRecord::snippet_only("just text");
        assert!(record.title.is_empty());
        assert_eq!(record.snippet, "just text");
        assert!(record.url.is_empty());
    }

    #[test]
    fn review_text_renders_verbatim() {
        let review = Review::Text("• bullet one\n• bullet two".to_string());
        assert_eq!(review.render(), "• bullet one\n• bullet two");
    }

    #[test]
    fn review_scored_renders_scores_and_suggestions() {
        let review = Review::Scored(ReviewScores {
            coherence: 0.8,
            veracity: 0.9,
            style: 0.7,
            suggestions: vec!["tighten the intro".to_string()],
        });
        let rendered = review.render();
        assert!(rendered.contains("coherence: 0.8"));
        assert!(rendered.contains("- tighten the intro"));
    }

    #[test]
    fn review_untagged_deserialization() {
        let text: Review = serde_json::from_str("\"looks fine\"").unwrap();
        assert_eq!(text, Review::Text("looks fine".to_string()));

        let scored: Review = serde_json::from_str(
            r#"{"coherence": 0.5, "veracity": 0.5, "style": 0.5, "suggestions": []}"#,
        )
        .unwrap();
        assert!(matches!(scored, Review::Scored(_)));
    }

    #[test]
    fn pipeline_result_unique_run_ids() {
        let a = PipelineResult::new("t", vec![], "d", Review::Text("r".into()), "f");
        let b = PipelineResult::new("t", vec![], "d", Review::Text("r".into()), "f");
        assert_ne!(a.run_id, b.run_id);
        assert!(a.run_id.starts_with("run_"));
    }

    #[test]
    fn pipeline_result_serialization_roundtrip() {
        let result = PipelineResult::new(
            "bias in LLMs",
            vec![SourceRecord::new("A", "foo", "u1")],
            "draft text",
            Review::Text("• adequate".to_string()),
            "final text",
        );
        let json = serde_json::to_string(&result).unwrap();
        let deserialized: PipelineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.topic, "bias in LLMs");
        assert_eq!(deserialized.sources.len(), 1);
        assert_eq!(deserialized.final_report, "final text");
    }
}
