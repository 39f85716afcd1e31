//! Prompt templates for search queries and synthesis.
//!
//! Every piece of prompt interpolation in the pipeline goes through
//! [`PromptLibrary`], so prompt wording can change without touching call
//! sites. Templates are Handlebars with strict mode off: missing optional
//! variables render as empty text.

use crate::types::ResearchQuery;
use handlebars::Handlebars;
use serde_json::json;

/// System prompt for the synthesis completion.
const SYSTEM_PROMPT: &str = "\
You are an expert Account-Based Marketing strategist for {{brand_name}}, an \
internal email and communications platform. Analyze the provided web search \
results for the target company and produce a structured profile for a BDR \
one-pager.

Respond with a single JSON object and nothing else. Keys:
- \"overview\": 2-3 sentences on the company's core industry and value proposition.
- \"pain_points\": the internal-communication challenges implied by the findings.
- \"news\": notable change events from the last 6 months (hiring spikes, leadership changes, acquisitions, expansions).
- \"angle\": 2 specific value propositions for {{brand_name}} that address this company's situation.
- \"snapshot\": object with \"industry\", \"size\", \"location\", and \"tech_stack\" (array of tool names).
- \"openers\": array of at most 2 objects with \"label\" and \"script\" for a call opener.

Leave any key you cannot support from the context as an empty string. Do not \
invent facts.";

/// User prompt carrying the target and the collected context.
const USER_PROMPT: &str = "\
Target Company: {{company}}{{#if domain}} ({{domain}}){{/if}}
{{#if extra}}Additional context: {{extra}}
{{/if}}
Context Found:
{{context}}";

/// General firmographics / change-event search query.
const QUERY_GENERAL: &str = "\
Research {{company}}{{#if domain}} ({{domain}}){{/if}}. Find: recent change \
events in the last 6 months (hiring spikes, leadership changes, acquisitions, \
expansions), accurate headquarters location and employee count, and their \
core industry and value proposition.";

/// Tech-stack search query.
const QUERY_TECH: &str = "\
What software and tech stack does {{company}} use? Look for HRIS, internal \
comms tools (Slack, Microsoft Teams, SharePoint), or employee engagement \
platforms.";

/// The single templating interface for the pipeline.
pub struct PromptLibrary {
    engine: Handlebars<'static>,
}

impl PromptLibrary {
    pub fn new() -> Self {
        let mut engine = Handlebars::new();
        engine.set_strict_mode(false);
        // Prompts are plain text, not HTML.
        engine.register_escape_fn(handlebars::no_escape);
        Self { engine }
    }

    fn render(
        &self,
        template: &str,
        vars: &serde_json::Value,
    ) -> Result<String, handlebars::RenderError> {
        self.engine.render_template(template, vars)
    }

    /// Render the synthesis system prompt for a brand.
    pub fn system_prompt(&self, brand_name: &str) -> Result<String, handlebars::RenderError> {
        self.render(SYSTEM_PROMPT, &json!({ "brand_name": brand_name }))
    }

    /// Render the synthesis user prompt from the query and collected context.
    pub fn user_prompt(
        &self,
        query: &ResearchQuery,
        context: &str,
    ) -> Result<String, handlebars::RenderError> {
        self.render(
            USER_PROMPT,
            &json!({
                "company": query.company,
                "domain": query.domain,
                "extra": query.context,
                "context": context,
            }),
        )
    }

    /// Render the general firmographics search query.
    pub fn general_query(&self, query: &ResearchQuery) -> Result<String, handlebars::RenderError> {
        self.render(
            QUERY_GENERAL,
            &json!({ "company": query.company, "domain": query.domain }),
        )
    }

    /// Render the tech-stack search query.
    pub fn tech_query(&self, query: &ResearchQuery) -> Result<String, handlebars::RenderError> {
        self.render(QUERY_TECH, &json!({ "company": query.company }))
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}
