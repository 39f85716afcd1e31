//! Synthesis — turns collected search results into structured insights.
//!
//! One prompt, one completion call, one strict parse. The model is asked
//! for a single JSON object; fields it omits default to empty values, and
//! output that is not JSON at all fails the stage with a distinct error.

use crate::error::SynthesisError;
use crate::prompt::PromptLibrary;
use crate::providers::LlmProvider;
use crate::types::{CompanyInsights, CompletionRequest, Message, ResearchQuery, SearchResults};
use std::sync::Arc;
use tracing::{debug, info};

/// Synthesizes company insights from search results.
pub struct Synthesizer {
    provider: Arc<dyn LlmProvider>,
    prompts: Arc<PromptLibrary>,
    brand_name: String,
}

impl Synthesizer {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        prompts: Arc<PromptLibrary>,
        brand_name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            prompts,
            brand_name: brand_name.into(),
        }
    }

    /// Run one completion over the collected results and parse the output.
    ///
    /// The returned insights always carry every section; missing model
    /// output defaults to empty rather than failing the pipeline.
    pub async fn synthesize(
        &self,
        query: &ResearchQuery,
        results: &[SearchResults],
    ) -> Result<CompanyInsights, SynthesisError> {
        let context = build_context(results);

        let system = self
            .prompts
            .system_prompt(&self.brand_name)
            .map_err(|e| SynthesisError::Template {
                message: e.to_string(),
            })?;
        let user = self
            .prompts
            .user_prompt(query, &context)
            .map_err(|e| SynthesisError::Template {
                message: e.to_string(),
            })?;

        let request = CompletionRequest::new(vec![Message::system(system), Message::user(user)]);

        debug!(company = query.company.as_str(), "Requesting synthesis");
        let response = self.provider.complete(request).await?;

        info!(
            company = query.company.as_str(),
            model = response.model.as_str(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Synthesis completed"
        );

        parse_insights(&response.text)
    }
}

/// Assemble the labeled context block handed to the model.
fn build_context(results: &[SearchResults]) -> String {
    results
        .iter()
        .map(|r| {
            let body = if r.is_empty() {
                "(no results)".to_string()
            } else {
                r.as_context()
            };
            format!("{}:\n{}", r.label.to_uppercase(), body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parse model output into `CompanyInsights`.
///
/// Accepts bare JSON, fenced JSON, or JSON embedded in surrounding prose.
/// Unknown keys are ignored and missing keys default; only output with no
/// parseable JSON object fails.
pub fn parse_insights(text: &str) -> Result<CompanyInsights, SynthesisError> {
    let stripped = strip_code_fences(text);

    if let Ok(insights) = serde_json::from_str::<CompanyInsights>(stripped) {
        return Ok(insights);
    }

    if let Some(object) = extract_json_object(stripped) {
        if let Ok(insights) = serde_json::from_str::<CompanyInsights>(object) {
            return Ok(insights);
        }
    }

    Err(SynthesisError::Unparseable {
        message: format!(
            "expected a JSON object, got: {}",
            text.chars().take(120).collect::<String>()
        ),
    })
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// The outermost `{...}` span of the text, if any.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::providers::MockProvider;
    use crate::search::MockSearchClient;
    use pretty_assertions::assert_eq;

    const FULL_RESPONSE: &str = r#"{
        "overview": "Acme Corp is a widget maker.",
        "pain_points": "Distributed plants, no shared comms channel.",
        "news": "Acquired Widgets-R-Us in June.",
        "angle": "Reach frontline workers without email addresses.",
        "snapshot": {
            "industry": "Manufacturing",
            "size": "5,000+",
            "location": "Toledo, OH",
            "tech_stack": ["Workday", "Microsoft Teams"]
        },
        "openers": [{"label": "News hook", "script": "Saw the acquisition news..."}]
    }"#;

    fn make_results() -> Vec<SearchResults> {
        vec![
            SearchResults::new("general", vec![MockSearchClient::hit("Acme news")]),
            SearchResults::new("tech_stack", vec![MockSearchClient::hit("Acme stack")]),
        ]
    }

    fn make_synthesizer(provider: MockProvider) -> Synthesizer {
        Synthesizer::new(
            Arc::new(provider),
            Arc::new(PromptLibrary::new()),
            "Workshop",
        )
    }

    #[tokio::test]
    async fn test_synthesize_full_response() {
        let synthesizer = make_synthesizer(MockProvider::with_response(FULL_RESPONSE));
        let insights = synthesizer
            .synthesize(&ResearchQuery::new("Acme Corp"), &make_results())
            .await
            .unwrap();

        assert_eq!(insights.overview, "Acme Corp is a widget maker.");
        assert_eq!(insights.snapshot.industry, "Manufacturing");
        assert_eq!(insights.snapshot.tech_stack.len(), 2);
        assert_eq!(insights.openers.len(), 1);
    }

    #[tokio::test]
    async fn test_synthesize_missing_news_defaults_to_empty() {
        let response = r#"{"overview": "Acme.", "pain_points": "Silos.", "angle": "Reach."}"#;
        let synthesizer = make_synthesizer(MockProvider::with_response(response));
        let insights = synthesizer
            .synthesize(&ResearchQuery::new("Acme Corp"), &make_results())
            .await
            .unwrap();

        assert_eq!(insights.news, "");
        assert_eq!(insights.overview, "Acme.");
    }

    #[tokio::test]
    async fn test_synthesize_provider_error_propagates() {
        let provider = MockProvider::new();
        provider.queue(Err(LlmError::RateLimited {
            retry_after_secs: 10,
        }));
        let synthesizer = make_synthesizer(provider);

        let err = synthesizer
            .synthesize(&ResearchQuery::new("Acme Corp"), &make_results())
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Llm(_)));
    }

    #[tokio::test]
    async fn test_synthesize_prose_output_is_unparseable() {
        let synthesizer =
            make_synthesizer(MockProvider::with_response("I could not find anything useful."));
        let err = synthesizer
            .synthesize(&ResearchQuery::new("Acme Corp"), &make_results())
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Unparseable { .. }));
    }

    #[test]
    fn test_parse_insights_fenced() {
        let fenced = format!("```json\n{FULL_RESPONSE}\n```");
        let insights = parse_insights(&fenced).unwrap();
        assert_eq!(insights.snapshot.location, "Toledo, OH");
    }

    #[test]
    fn test_parse_insights_embedded_in_prose() {
        let wrapped = format!("Here is the profile you asked for:\n{FULL_RESPONSE}\nLet me know!");
        let insights = parse_insights(&wrapped).unwrap();
        assert_eq!(insights.news, "Acquired Widgets-R-Us in June.");
    }

    #[test]
    fn test_parse_insights_ignores_unknown_keys() {
        let json = r#"{"overview": "Acme.", "confidence": 0.9, "sources": []}"#;
        let insights = parse_insights(json).unwrap();
        assert_eq!(insights.overview, "Acme.");
    }

    #[test]
    fn test_parse_insights_rejects_non_json() {
        assert!(parse_insights("").is_err());
        assert!(parse_insights("null").is_err());
        assert!(parse_insights("no braces here").is_err());
    }

    #[test]
    fn test_build_context_marks_empty_sections() {
        let results = vec![
            SearchResults::new("general", vec![MockSearchClient::hit("A")]),
            SearchResults::new("tech_stack", vec![]),
        ];
        let context = build_context(&results);
        assert!(context.contains("GENERAL:"));
        assert!(context.contains("TECH_STACK:\n(no results)"));
    }
}
