//! # OnePager Core
//!
//! Core library for the account one-pager generator. Provides the search
//! collector, LLM synthesis, PDF rendering, configuration, and the pipeline
//! that ties them together: one company in, one branded PDF out.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod render;
pub mod search;
pub mod synthesis;
pub mod types;

// Re-export commonly used types at the crate root.
pub use config::{load_config, require_api_keys, AppConfig, BrandingConfig};
pub use error::{OnePagerError, PipelineError, Result};
pub use pipeline::{NoOpCallback, Pipeline, PipelineCallback, PipelinePhase};
pub use prompt::PromptLibrary;
pub use providers::{create_provider, LlmProvider};
pub use render::PdfRenderer;
pub use search::{Collector, SearchClient, TavilyClient};
pub use synthesis::Synthesizer;
pub use types::{CompanyInsights, OnePager, ResearchQuery, SearchHit, SearchResults, SourceRef};
