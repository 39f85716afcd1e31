//! Core type definitions for the one-pager pipeline.
//!
//! Defines the data that flows through a request: the research query, the
//! collected search results, the synthesized company insights, and the
//! completion request/response types used by LLM providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable input for one generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchQuery {
    /// Target company name. Must be non-empty.
    pub company: String,
    /// Optional company website or domain hint.
    pub domain: Option<String>,
    /// Optional free-text context for the researcher prompt.
    pub context: Option<String>,
}

impl ResearchQuery {
    /// Create a query for a company name, trimming surrounding whitespace.
    pub fn new(company: impl Into<String>) -> Self {
        Self {
            company: company.into().trim().to_string(),
            domain: None,
            context: None,
        }
    }

    /// Attach a website/domain hint.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into().trim().to_string();
        self.domain = if domain.is_empty() {
            None
        } else {
            Some(domain)
        };
        self
    }

    /// Whether the query carries a usable company name.
    pub fn is_valid(&self) -> bool {
        !self.company.is_empty()
    }
}

/// A single search result entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Extracted page text returned by the search API.
    pub content: String,
    /// Relevance score reported by the search API (0.0-1.0).
    #[serde(default)]
    pub score: f64,
}

/// Ordered, bounded search results for one labeled query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Short label for the query that produced these hits
    /// (e.g. "general", "tech_stack").
    pub label: String,
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    pub fn new(label: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        Self {
            label: label.into(),
            hits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Format the hits as a source-labeled text block for the synthesis
    /// prompt.
    pub fn as_context(&self) -> String {
        self.hits
            .iter()
            .map(|hit| format!("Source: {}\n{}", hit.title, hit.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// References to the underlying sources, in order.
    pub fn source_refs(&self) -> Vec<SourceRef> {
        self.hits
            .iter()
            .map(|hit| SourceRef {
                title: hit.title.clone(),
                url: hit.url.clone(),
            })
            .collect()
    }
}

/// A cited source carried alongside the insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
}

/// Firmographic snapshot extracted by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

/// A suggested conversation opener for outreach.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallOpener {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub script: String,
}

/// The synthesized marketing record for one company.
///
/// Every field defaults when the model omits it, so a deserialized value
/// always carries the full set of sections (possibly empty) and the
/// renderer never sees a partially-populated structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInsights {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub pain_points: String,
    #[serde(default)]
    pub news: String,
    #[serde(default)]
    pub angle: String,
    #[serde(default)]
    pub snapshot: CompanySnapshot,
    #[serde(default)]
    pub openers: Vec<CallOpener>,
}

impl CompanyInsights {
    /// Whether any of the four required sections carries text.
    pub fn has_content(&self) -> bool {
        !self.overview.is_empty()
            || !self.pain_points.is_empty()
            || !self.news.is_empty()
            || !self.angle.is_empty()
    }
}

/// Represents a participant role in a completion conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message sent to a completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A request for an LLM completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    /// Optional model override; the provider default is used when `None`.
    pub model: Option<String>,
    pub max_tokens: Option<usize>,
    /// Optional temperature override; the provider default is used when `None`.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// A completed (non-streaming) LLM response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Concatenated text content of the response.
    pub text: String,
    pub usage: TokenUsage,
    pub model: String,
    pub finish_reason: Option<String>,
}

/// The finished artifact for one request.
#[derive(Debug, Clone)]
pub struct OnePager {
    pub request_id: Uuid,
    pub company: String,
    pub insights: CompanyInsights,
    pub sources: Vec<SourceRef>,
    pub pdf_bytes: Vec<u8>,
    /// When the artifact was produced. Not embedded in the document body.
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_trims_and_validates() {
        let query = ResearchQuery::new("  Acme Corp  ");
        assert_eq!(query.company, "Acme Corp");
        assert!(query.is_valid());

        let empty = ResearchQuery::new("   ");
        assert!(!empty.is_valid());
    }

    #[test]
    fn test_query_with_domain_drops_blank() {
        let query = ResearchQuery::new("Acme").with_domain("  ");
        assert_eq!(query.domain, None);

        let query = ResearchQuery::new("Acme").with_domain("acme.com");
        assert_eq!(query.domain.as_deref(), Some("acme.com"));
    }

    #[test]
    fn test_search_results_context_labels_sources() {
        let results = SearchResults::new(
            "general",
            vec![
                SearchHit {
                    title: "Acme raises Series B".into(),
                    url: "https://news.example.com/acme".into(),
                    content: "Acme Corp announced...".into(),
                    score: 0.9,
                },
                SearchHit {
                    title: "Acme careers".into(),
                    url: "https://acme.com/careers".into(),
                    content: "We are hiring.".into(),
                    score: 0.5,
                },
            ],
        );
        let context = results.as_context();
        assert!(context.starts_with("Source: Acme raises Series B"));
        assert!(context.contains("Source: Acme careers"));
        assert_eq!(results.source_refs().len(), 2);
    }

    #[test]
    fn test_insights_default_has_all_fields_empty() {
        let insights = CompanyInsights::default();
        assert_eq!(insights.overview, "");
        assert_eq!(insights.pain_points, "");
        assert_eq!(insights.news, "");
        assert_eq!(insights.angle, "");
        assert!(insights.openers.is_empty());
        assert!(!insights.has_content());
    }

    #[test]
    fn test_insights_deserialize_missing_fields_default() {
        let json = r#"{"overview": "Acme Corp is a widget maker."}"#;
        let insights: CompanyInsights = serde_json::from_str(json).unwrap();
        assert_eq!(insights.overview, "Acme Corp is a widget maker.");
        assert_eq!(insights.news, "");
        assert_eq!(insights.snapshot, CompanySnapshot::default());
        assert!(insights.has_content());
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::system("You are a strategist.");
        assert_eq!(msg.role, Role::System);
        let msg = Message::user("Target: Acme");
        assert_eq!(msg.role, Role::User);
    }
}
