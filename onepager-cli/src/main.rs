//! OnePager CLI — single-shot generation of an account one-pager.
//!
//! Runs the full Collector -> Synthesizer -> Renderer pipeline for one
//! company and writes the resulting PDF to disk.

use anyhow::Context;
use clap::Parser;
use onepager_core::pipeline::{Pipeline, PipelineCallback, PipelinePhase};
use onepager_core::types::ResearchQuery;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Generate a branded account one-pager from live web research.
#[derive(Parser, Debug)]
#[command(name = "onepager", version, about, long_about = None)]
struct Cli {
    /// Target company name
    company: String,

    /// Company website or domain (improves search accuracy)
    #[arg(short, long)]
    domain: Option<String>,

    /// Output PDF path (default: <Brand>_Strategy_<Company>.pdf)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

/// Prints phase changes to stderr so the user can follow along.
struct StderrProgress;

impl PipelineCallback for StderrProgress {
    fn on_phase_change(&self, phase: PipelinePhase, _progress: f32) {
        match phase {
            PipelinePhase::Collecting => eprintln!("  Searching live web data..."),
            PipelinePhase::Synthesizing => eprintln!("  Synthesizing insights..."),
            PipelinePhase::Rendering => eprintln!("  Rendering PDF..."),
            PipelinePhase::Complete => {}
        }
    }
}

/// Build a filesystem-safe default output name for a company.
fn default_output_name(brand: &str, company: &str) -> PathBuf {
    let sanitize = |s: &str| {
        s.chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect::<String>()
    };
    PathBuf::from(format!(
        "{}_Strategy_{}.pdf",
        sanitize(brand),
        sanitize(company)
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(filter));
    tracing_subscriber::registry().with(stderr_layer).init();

    let workspace = std::env::current_dir().ok();
    let config = onepager_core::load_config(workspace.as_deref(), None)
        .context("Failed to load configuration")?;

    for warning in config.validate() {
        tracing::warn!("{warning}");
    }

    // Both API keys are required before any request is attempted.
    onepager_core::require_api_keys(&config)
        .context("Startup check failed: set the missing API key and retry")?;

    let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;

    let mut query = ResearchQuery::new(&cli.company);
    if let Some(domain) = &cli.domain {
        query = query.with_domain(domain);
    }

    if !cli.quiet {
        eprintln!("Generating one-pager for {}...", query.company);
    }

    let one_pager = pipeline
        .run_with_callback(&query, &StderrProgress)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let out = cli
        .out
        .unwrap_or_else(|| default_output_name(&config.branding.brand_name, &query.company));
    std::fs::write(&out, &one_pager.pdf_bytes)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    if !cli.quiet {
        eprintln!(
            "Wrote {} ({} bytes, {} sources analyzed)",
            out.display(),
            one_pager.pdf_bytes.len(),
            one_pager.sources.len()
        );
    }

    Ok(())
}
