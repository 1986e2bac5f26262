//! Markdown rendering of a pipeline result.

use std::path::Path;

use calliope_common::{PipelineResult, Result};
use tracing::info;

/// Render a pipeline result as a single Markdown document with fixed
/// section headers: enumerated sources, the final summary, and the
/// reviewer feedback.
pub fn render_report(result: &PipelineResult) -> String {
    let mut doc = format!("# Research Report: {}\n\n", result.topic);

    doc.push_str("## Sources\n\n");
    if result.sources.is_empty() {
        doc.push_str("_No sources were available for this run._\n");
    } else {
        for (i, source) in result.sources.iter().enumerate() {
            let title = if source.title.is_empty() {
                "(untitled)"
            } else {
                &source.title
            };
            doc.push_str(&format!("{}. **{}**: {}", i + 1, title, source.snippet));
            if !source.url.is_empty() {
                doc.push_str(&format!(" (<{}>)", source.url));
            }
            doc.push('\n');
        }
    }

    doc.push_str("\n## Final Summary\n\n");
    doc.push_str(&result.final_report);

    doc.push_str("\n\n## Reviewer Feedback\n\n");
    doc.push_str(&result.review.render());
    doc.push('\n');

    doc
}

/// Write the rendered report to `path`.
pub fn write_report(result: &PipelineResult, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_report(result))?;
    info!(path = %path.display(), run_id = %result.run_id, "Report written");
    Ok(())
}
