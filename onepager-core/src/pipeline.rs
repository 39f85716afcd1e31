//! Pipeline orchestration — Collector -> Synthesizer -> Renderer.
//!
//! One call to [`Pipeline::run`] drives a full request. The stages run
//! strictly in order; the first stage error aborts the run and is returned
//! tagged with the stage that failed. The run is an ordinary future, so
//! dropping it (e.g. a disconnected client) abandons any in-flight network
//! call without surfacing a partial result.

use crate::config::AppConfig;
use crate::error::{ConfigError, PipelineError};
use crate::prompt::PromptLibrary;
use crate::providers::create_provider;
use crate::render::PdfRenderer;
use crate::search::{Collector, TavilyClient};
use crate::synthesis::Synthesizer;
use crate::types::{OnePager, ResearchQuery, SourceRef};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// The stage a request is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Collecting,
    Synthesizing,
    Rendering,
    Complete,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Collecting => write!(f, "collecting"),
            PipelinePhase::Synthesizing => write!(f, "synthesizing"),
            PipelinePhase::Rendering => write!(f, "rendering"),
            PipelinePhase::Complete => write!(f, "complete"),
        }
    }
}

/// Progress reporting for front-ends.
pub trait PipelineCallback: Send + Sync {
    /// Called when the pipeline enters a new phase. `progress` is a rough
    /// completion fraction in [0.0, 1.0].
    fn on_phase_change(&self, phase: PipelinePhase, progress: f32);
}

/// A callback that ignores all events.
pub struct NoOpCallback;

impl PipelineCallback for NoOpCallback {
    fn on_phase_change(&self, _phase: PipelinePhase, _progress: f32) {}
}

/// The request pipeline. Holds the read-only stage components; carries no
/// per-request state, so one instance serves concurrent requests.
pub struct Pipeline {
    collector: Collector,
    synthesizer: Synthesizer,
    renderer: PdfRenderer,
}

impl Pipeline {
    pub fn new(collector: Collector, synthesizer: Synthesizer, renderer: PdfRenderer) -> Self {
        Self {
            collector,
            synthesizer,
            renderer,
        }
    }

    /// Build the pipeline from configuration, constructing the real search
    /// and completion clients. Fails fast when either API key is absent.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let prompts = Arc::new(PromptLibrary::new());
        let search_client = Arc::new(TavilyClient::new(&config.search)?);
        let provider = create_provider(&config.llm)?;

        let collector = Collector::new(search_client, Arc::clone(&prompts), config.search.clone());
        let synthesizer =
            Synthesizer::new(provider, prompts, config.branding.brand_name.clone());
        let renderer = PdfRenderer::new(config.branding.clone());

        Ok(Self::new(collector, synthesizer, renderer))
    }

    /// Run the full pipeline for one query.
    pub async fn run(&self, query: &ResearchQuery) -> Result<OnePager, PipelineError> {
        self.run_with_callback(query, &NoOpCallback).await
    }

    /// Run the full pipeline, reporting phase changes to `callback`.
    pub async fn run_with_callback(
        &self,
        query: &ResearchQuery,
        callback: &dyn PipelineCallback,
    ) -> Result<OnePager, PipelineError> {
        let request_id = Uuid::new_v4();
        info!(
            request_id = %request_id,
            company = query.company.as_str(),
            "Starting one-pager generation"
        );

        callback.on_phase_change(PipelinePhase::Collecting, 0.1);
        let results = self.collector.collect(query).await?;
        let sources: Vec<SourceRef> = results.iter().flat_map(|r| r.source_refs()).collect();

        callback.on_phase_change(PipelinePhase::Synthesizing, 0.4);
        let insights = self.synthesizer.synthesize(query, &results).await?;

        callback.on_phase_change(PipelinePhase::Rendering, 0.8);
        let pdf_bytes = self
            .renderer
            .render(&query.company, &insights, sources.len())?;

        callback.on_phase_change(PipelinePhase::Complete, 1.0);
        info!(
            request_id = %request_id,
            company = query.company.as_str(),
            sources = sources.len(),
            pdf_bytes = pdf_bytes.len(),
            "One-pager generated"
        );

        Ok(OnePager {
            request_id,
            company: query.company.clone(),
            insights,
            sources,
            pdf_bytes,
            generated_at: chrono::Utc::now(),
        })
    }
}
