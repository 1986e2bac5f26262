//! Specialist agents for the Calliope research pipeline.
//!
//! This crate provides the three pipeline stages:
//!
//! - **Research Agent**: web search and source normalization
//! - **Writing Agent**: report drafting and revision
//! - **Review Agent**: draft critique, heuristic or delegated
//!
//! # Architecture
//!
//! Each agent wraps one collaborator contract from `calliope-backends` and
//! owns the degrade step for its stage: a failing collaborator produces a
//! lower-quality value, never an error that crosses the stage boundary.
//!
//! ```text
//! topic ──► ResearchAgent ──► WritingAgent ──► ReviewAgent ──► final
//!              (sources)        (draft)         (review)
//! ```

pub mod research;
pub mod review;
pub mod writing;

pub use research::{ResearchAgent, ResearchConfig};
pub use review::{ReviewAgent, ReviewMode, ReviewThresholds};
pub use writing::WritingAgent;
