//! Configuration for the one-pager generator.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment variables -> explicit overrides.
//! API keys are never stored in config files; config holds the *names* of
//! the environment variables that carry them, and [`require_api_keys`]
//! checks both at startup.

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub branding: BrandingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Validate the whole config and return any warnings.
    ///
    /// Returns an empty Vec if the config is valid. Warnings are
    /// human-readable; none of them is fatal.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        warnings.extend(self.llm.validate());
        warnings.extend(self.search.validate());
        warnings.extend(self.branding.validate());
        warnings
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name. Only "anthropic" is currently wired up.
    pub provider: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Optional base URL override for the API endpoint.
    pub base_url: Option<String>,
    /// Maximum tokens to generate in a response.
    pub max_tokens: usize,
    /// Temperature for generation.
    pub temperature: f32,
    /// Ceiling applied to the completion HTTP call.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-haiku-4-5-20251001".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: None,
            max_tokens: 2000,
            temperature: 0.2,
            request_timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Validate this LLM config and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.model.is_empty() {
            warnings.push("llm.model is empty; completions will fail".to_string());
        }
        if self.temperature < 0.0 || self.temperature > 1.0 {
            warnings.push(format!(
                "llm.temperature ({}) outside [0.0, 1.0]; the API may reject it",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            warnings.push("llm.max_tokens is 0; responses will be empty".to_string());
        }
        if self.request_timeout_secs == 0 {
            warnings.push("llm.request_timeout_secs is 0; requests will never complete".to_string());
        }
        warnings
    }
}

/// Search API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Environment variable name containing the search API key.
    pub api_key_env: String,
    /// Base URL for the search API.
    pub base_url: String,
    /// Search depth parameter passed to the API.
    pub search_depth: String,
    /// Maximum hits kept per query.
    pub max_results_per_query: usize,
    /// Ceiling applied to each search HTTP call.
    pub request_timeout_secs: u64,
    /// Whether to retry once immediately on a transient network failure.
    pub retry_transient: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: "TAVILY_API_KEY".to_string(),
            base_url: "https://api.tavily.com".to_string(),
            search_depth: "advanced".to_string(),
            max_results_per_query: 5,
            request_timeout_secs: 30,
            retry_transient: true,
        }
    }
}

impl SearchConfig {
    /// Validate this search config and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.max_results_per_query == 0 {
            warnings.push(
                "search.max_results_per_query is 0; every search will return no results"
                    .to_string(),
            );
        }
        if self.max_results_per_query > 10 {
            warnings.push(format!(
                "search.max_results_per_query ({}) is large; synthesis context may overflow",
                self.max_results_per_query
            ));
        }
        if !self.base_url.starts_with("http") {
            warnings.push(format!(
                "search.base_url ('{}') does not look like a URL",
                self.base_url
            ));
        }
        warnings
    }
}

/// Branding applied to every rendered one-pager.
///
/// Loaded once at startup and shared read-only across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// Brand name shown in the document header.
    pub brand_name: String,
    /// Short tagline shown under the brand name.
    pub tagline: String,
    /// Accent color as a `#rrggbb` hex string.
    pub accent_color: String,
    /// Footer line shown on every page.
    pub footer_text: String,
    /// Optional logo image path (reserved for future layouts).
    pub logo_path: Option<PathBuf>,
    /// Optional directory containing the font files.
    pub font_dir: Option<PathBuf>,
    /// Font family name used for the document.
    pub font_family: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            brand_name: "Workshop".to_string(),
            tagline: "Account Intelligence Brief".to_string(),
            accent_color: "#1e3a8a".to_string(),
            footer_text: "Internal Use Only".to_string(),
            logo_path: None,
            font_dir: None,
            font_family: "LiberationSans".to_string(),
        }
    }
}

impl BrandingConfig {
    /// Validate branding and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.brand_name.trim().is_empty() {
            warnings.push("branding.brand_name is blank".to_string());
        }
        if parse_hex_color(&self.accent_color).is_none() {
            warnings.push(format!(
                "branding.accent_color ('{}') is not a #rrggbb value; using the default",
                self.accent_color
            ));
        }
        warnings
    }

    /// The accent color as an RGB triple, falling back to the default
    /// when the configured value is unparseable.
    pub fn accent_rgb(&self) -> (u8, u8, u8) {
        parse_hex_color(&self.accent_color).unwrap_or((0x1e, 0x3a, 0x8a))
    }
}

/// Web front-end configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8484,
        }
    }
}

fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `ONEPAGER_`)
/// 3. Workspace-local config (`.onepager/config.toml`)
/// 4. User config (`~/.config/onepager/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&AppConfig>,
) -> Result<AppConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(dirs) = directories::ProjectDirs::from("com", "workshop", "onepager") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".onepager").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (ONEPAGER_LLM__MODEL, ONEPAGER_SERVER__PORT, ...)
    figment = figment.merge(Env::prefixed("ONEPAGER_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}

/// Verify that both required API keys are present in the environment.
///
/// Absence of either key is a fatal startup error, not a per-request error.
pub fn require_api_keys(config: &AppConfig) -> Result<(), ConfigError> {
    for var in [&config.search.api_key_env, &config.llm.api_key_env] {
        if std::env::var(var).map(|v| v.is_empty()).unwrap_or(true) {
            return Err(ConfigError::EnvVarMissing { var: var.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.search.api_key_env, "TAVILY_API_KEY");
        assert_eq!(config.search.max_results_per_query, 5);
        assert_eq!(config.branding.brand_name, "Workshop");
        assert_eq!(config.server.port, 8484);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_warns_on_bad_temperature() {
        let mut config = AppConfig::default();
        config.llm.temperature = 3.0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("temperature"));
    }

    #[test]
    fn test_validate_warns_on_blank_brand_and_bad_color() {
        let mut config = AppConfig::default();
        config.branding.brand_name = "  ".into();
        config.branding.accent_color = "blue".into();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_accent_rgb_parses_hex() {
        let branding = BrandingConfig {
            accent_color: "#ff00aa".into(),
            ..Default::default()
        };
        assert_eq!(branding.accent_rgb(), (0xff, 0x00, 0xaa));
    }

    #[test]
    fn test_accent_rgb_falls_back_on_garbage() {
        let branding = BrandingConfig {
            accent_color: "not-a-color".into(),
            ..Default::default()
        };
        assert_eq!(branding.accent_rgb(), (0x1e, 0x3a, 0x8a));
    }

    #[test]
    fn test_load_config_defaults_without_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.llm.provider, "anthropic");
    }

    #[test]
    fn test_load_config_workspace_file_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg_dir = dir.path().join(".onepager");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[branding]\nbrand_name = \"Acme Outreach\"\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.branding.brand_name, "Acme Outreach");
        // Untouched sections keep their defaults.
        assert_eq!(config.search.search_depth, "advanced");
    }

    #[test]
    fn test_require_api_keys_missing_is_fatal() {
        let mut config = AppConfig::default();
        config.search.api_key_env = "ONEPAGER_TEST_NO_SUCH_KEY".into();
        let err = require_api_keys(&config).unwrap_err();
        match err {
            ConfigError::EnvVarMissing { var } => {
                assert_eq!(var, "ONEPAGER_TEST_NO_SUCH_KEY");
            }
            other => panic!("Expected EnvVarMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_require_api_keys_present() {
        // PATH is always present; stand in for both key variables.
        let mut config = AppConfig::default();
        config.search.api_key_env = "PATH".into();
        config.llm.api_key_env = "PATH".into();
        assert!(require_api_keys(&config).is_ok());
    }
}
