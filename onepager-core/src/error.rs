//! Error types for the one-pager pipeline.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering configuration, search collection, LLM synthesis, and PDF
//! rendering. `PipelineError` wraps the stage errors so callers can tell
//! which stage of a request failed.

use std::path::PathBuf;

/// Top-level error type for the one-pager core library.
#[derive(Debug, thiserror::Error)]
pub enum OnePagerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the configuration system. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Errors from the search collector.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Search API authentication failed")]
    AuthFailed,

    #[error("Search API rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Search request failed: {message}")]
    RequestFailed { message: String },

    #[error("Search request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Search returned no usable results for '{query}'")]
    NoResults { query: String },
}

/// Errors from LLM provider interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from the synthesis stage.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Completion failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Prompt template failed to render: {message}")]
    Template { message: String },

    #[error("Model output could not be parsed as insights: {message}")]
    Unparseable { message: String },
}

/// Errors from the PDF renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("No usable font found (searched {searched})")]
    FontLoad { searched: String },

    #[error("Failed to render PDF: {message}")]
    RenderFailed { message: String },

    #[error("Failed to write PDF to {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A pipeline failure, tagged with the stage that produced it.
///
/// The `Display` output names the stage so front-ends can show the user
/// which step to retry.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Search unavailable: {0}")]
    Search(#[from] SearchError),

    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// Short machine-readable name of the failed stage.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Search(_) => "search",
            PipelineError::Synthesis(_) => "synthesis",
            PipelineError::Render(_) => "render",
        }
    }
}

/// A type alias for results using the top-level `OnePagerError`.
pub type Result<T> = std::result::Result<T, OnePagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_search() {
        let err = PipelineError::Search(SearchError::AuthFailed);
        assert_eq!(
            err.to_string(),
            "Search unavailable: Search API authentication failed"
        );
        assert_eq!(err.stage(), "search");
    }

    #[test]
    fn test_error_display_synthesis() {
        let err = PipelineError::Synthesis(SynthesisError::Unparseable {
            message: "not a JSON object".into(),
        });
        assert_eq!(
            err.to_string(),
            "Synthesis failed: Model output could not be parsed as insights: not a JSON object"
        );
        assert_eq!(err.stage(), "synthesis");
    }

    #[test]
    fn test_error_display_render() {
        let err = PipelineError::Render(RenderError::RenderFailed {
            message: "page overflow".into(),
        });
        assert_eq!(
            err.to_string(),
            "Rendering failed: Failed to render PDF: page overflow"
        );
        assert_eq!(err.stage(), "render");
    }

    #[test]
    fn test_error_display_config() {
        let err = OnePagerError::Config(ConfigError::EnvVarMissing {
            var: "TAVILY_API_KEY".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Environment variable not set: TAVILY_API_KEY"
        );
    }

    #[test]
    fn test_llm_error_into_pipeline() {
        let llm = LlmError::RateLimited {
            retry_after_secs: 30,
        };
        let err: PipelineError = SynthesisError::from(llm).into();
        assert_eq!(err.stage(), "synthesis");
        assert!(err.to_string().contains("retry after 30s"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: OnePagerError = io_err.into();
        assert!(matches!(err, OnePagerError::Io(_)));
    }

    #[test]
    fn test_search_error_no_results() {
        let err = SearchError::NoResults {
            query: "Acme Corp".into(),
        };
        assert_eq!(
            err.to_string(),
            "Search returned no usable results for 'Acme Corp'"
        );
    }
}
