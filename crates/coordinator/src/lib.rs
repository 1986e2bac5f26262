//! Pipeline coordinator for Calliope.
//!
//! The coordinator is the central piece that:
//! 1. Builds the three agents from configuration
//! 2. Sequences the fixed linear pipeline
//! 3. Assembles the final document
//!
//! # Architecture
//!
//! ```text
//! topic
//!   │
//!   ▼
//! ┌─────────────────┐
//! │   Coordinator   │
//! │  (this crate)   │
//! └────────┬────────┘
//!          │
//!    ┌─────┴──────┬───────────┐
//!    ▼            ▼           ▼
//! [Research]  [Writing]   [Review]
//!   Agent       Agent       Agent
//! ```
//!
//! States run strictly forward
//! (`Start → SourcesFetched → Drafted → Reviewed → Finalized → Done`)
//! and a run always terminates with a result: collaborator failures
//! degrade output quality, never control flow.

pub mod config;
pub mod pipeline;
pub mod report;

pub use config::{FinalizePolicy, PipelineConfig, ReviewConfig};
pub use pipeline::{Coordinator, PipelineStage};
pub use report::{render_report, write_report};
