//! Core coordinator implementation.

use calliope_agents::{ResearchAgent, ReviewAgent, ReviewMode, WritingAgent};
use calliope_backends::{build_generation_backend, build_search_backend};
use calliope_common::{CalliopeError, PipelineResult, Result, Review};
use tracing::{debug, info, warn};

use crate::config::{FinalizePolicy, PipelineConfig};

/// Heading of the fallback adjustments appendix.
const ADJUSTMENTS_HEADER: &str = "### adjustments:";

/// The linear pipeline states. Single-pass: no state is ever revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    SourcesFetched,
    Drafted,
    Reviewed,
    Finalized,
    Done,
}

/// The coordinator that sequences the three agents and assembles the
/// final document.
///
/// Collaborator failures never propagate out of [`Coordinator::run`]:
/// each stage degrades to a lower-quality value and the run always
/// produces a result.
pub struct Coordinator {
    research: ResearchAgent,
    writer: WritingAgent,
    reviewer: ReviewAgent,
    finalize: FinalizePolicy,
}

impl Coordinator {
    pub fn new(
        research: ResearchAgent,
        writer: WritingAgent,
        reviewer: ReviewAgent,
        finalize: FinalizePolicy,
    ) -> Self {
        Self {
            research,
            writer,
            reviewer,
            finalize,
        }
    }

    /// Build a coordinator and its collaborators from configuration.
    ///
    /// Credential and provider problems surface here, before any run
    /// starts; nothing later in the pipeline raises for them.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        info!(
            provider = %config.generation.provider,
            model = %config.generation.model,
            review_mode = ?config.review.mode,
            "Initializing pipeline coordinator"
        );

        let generation = build_generation_backend(&config.generation)?;
        let search = build_search_backend(&config.search)?;
        let params = config.generation.params();

        let research = ResearchAgent::new(search, config.research.clone());
        let writer = WritingAgent::new(generation.clone(), params);
        let reviewer = match config.review.mode {
            ReviewMode::Heuristic => ReviewAgent::heuristic(config.review.thresholds),
            ReviewMode::Delegated => {
                ReviewAgent::delegated(generation, params, config.review.thresholds)
            }
        };

        Ok(Self::new(research, writer, reviewer, config.finalize))
    }

    /// Run the pipeline for one topic.
    ///
    /// The only error is an empty topic; every collaborator failure
    /// degrades in place. Bounded work: one search call, at most two
    /// drafting calls, at most one delegated review call.
    pub async fn run(&self, topic: &str) -> Result<PipelineResult> {
        if topic.trim().is_empty() {
            return Err(CalliopeError::Config("topic must be non-empty".to_string()));
        }

        let mut stage = PipelineStage::Start;
        info!(topic = %topic, ?stage, "Starting pipeline run");

        let sources = self.research.fetch(topic).await;
        stage = PipelineStage::SourcesFetched;
        info!(?stage, source_count = sources.len(), "Sources fetched");

        let draft = self.writer.draft(topic, &sources).await;
        stage = PipelineStage::Drafted;
        info!(?stage, draft_len = draft.len(), "Draft produced");

        let review = self.reviewer.review(&draft, &sources).await;
        stage = PipelineStage::Reviewed;
        info!(?stage, review_mode = ?self.reviewer.mode(), "Review produced");

        let final_report = self.finalize_draft(topic, &draft, &review).await;
        stage = PipelineStage::Finalized;
        info!(?stage, final_len = final_report.len(), "Final report assembled");

        let result = PipelineResult::new(topic, sources, draft, review, final_report);
        stage = PipelineStage::Done;
        debug!(?stage, run_id = %result.run_id, "Pipeline run complete");

        Ok(result)
    }

    /// Finalization never fails: the regenerate path falls back to the
    /// verbatim appendix when the second drafting call errors.
    async fn finalize_draft(&self, topic: &str, draft: &str, review: &Review) -> String {
        let review_text = review.render();

        match self.finalize {
            FinalizePolicy::Append => append_review(draft, &review_text),
            FinalizePolicy::Regenerate => {
                match self.writer.revise(topic, draft, &review_text).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(
                            error = %e,
                            "Revision failed, appending the review verbatim"
                        );
                        append_review(draft, &review_text)
                    }
                }
            }
        }
    }
}

fn append_review(draft: &str, review: &str) -> String {
    format!("{draft}\n\n{ADJUSTMENTS_HEADER}\n{review}")
}
