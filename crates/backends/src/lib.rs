//! Collaborator contracts for the Calliope pipeline: web search and hosted
//! text generation, with concrete HTTP clients.
//!
//! Clients return raw response values; the shared extraction in
//! [`extract`] and the research agent's record normalization own all
//! shape handling, so every client stays a thin round-trip.

pub mod config;
pub mod extract;
pub mod generation;
pub mod hf;
pub mod openai_compat;
pub mod retry;
pub mod search;

pub use config::{
    GenerationConfig, SearchConfig, SemaphoredGeneration, build_generation_backend,
    build_search_backend,
};
pub use extract::extract_generated_text;
pub use generation::{GenerationBackend, GenerationParams};
pub use hf::HfInferenceClient;
pub use openai_compat::OpenAiCompatClient;
pub use retry::{RetryConfig, RetryingGeneration};
pub use search::{DuckDuckGoClient, SearchBackend};
