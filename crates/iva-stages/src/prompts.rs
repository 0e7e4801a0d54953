//! Prompt templates for the analysis stages.
//!
//! Handlebars templates registered once per process. Escaping is
//! disabled: prompts are plain text, not HTML.
use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::json;

use iva_core::{StageContext, StageError, StageId};

const SUMMARY_PROMPT: &str = "\
You are analyzing a startup idea.

Idea: {{idea_title}}
Description: {{idea_description}}
{{#if industry}}Industry: {{industry}}{{/if}}
{{#if answers}}
Follow-up answers from the founder:
{{#each answers}}
- {{this.question}}: {{this.answer}}
{{/each}}
{{/if}}
Write a concise summary of the idea and its core value proposition.

Respond with a JSON object:
{\"summary\": \"two or three sentences\", \"core_value\": \"one sentence\"}";

const TARGET_USER_PROMPT: &str = "\
You are profiling the target users of a startup idea.

Idea: {{idea_title}}
Description: {{idea_description}}
{{#if industry}}Industry: {{industry}}{{/if}}
{{#if answers}}
Follow-up answers from the founder:
{{#each answers}}
- {{this.question}}: {{this.answer}}
{{/each}}
{{/if}}
Analysis so far:
{{{prior_context}}}

Identify the most promising user segments and their pain points.

Respond with a JSON object:
{\"target_users\": [{\"segment\": \"...\", \"description\": \"...\", \"pain_points\": [\"...\"]}], \"pain_points\": [\"the overall top pain points\"]}";

const MARKET_ANALYSIS_PROMPT: &str = "\
You are assessing the market for a startup idea.

Idea: {{idea_title}}
Description: {{idea_description}}
{{#if industry}}Industry: {{industry}}{{/if}}
Analysis so far:
{{{prior_context}}}

Describe the competitive landscape, the main competitors, and the
addressable market size.

Respond with a JSON object:
{\"market_analysis\": \"...\", \"competitors\": [\"...\"], \"market_size\": \"...\"}";

const STRATEGY_PROMPT: &str = "\
You are advising on go-to-market strategy for a startup idea.

Idea: {{idea_title}}
Description: {{idea_description}}
Analysis so far:
{{{prior_context}}}

Recommend concrete next steps, name what differentiates the idea, and
list the main risks.

Respond with a JSON object:
{\"recommendations\": [\"...\"], \"differentiation\": \"...\", \"risks\": [\"...\"]}";

const SCORING_PROMPT: &str = "\
You are scoring a startup idea on a 0-100 scale.

Idea: {{idea_title}}
Description: {{idea_description}}
Analysis so far:
{{{prior_context}}}

Score the idea overall and per dimension (0-100 each), and state your
confidence in the assessment as High, Medium or Low.

Respond with a JSON object:
{\"score\": 0,
 \"confidence_level\": \"Medium\",
 \"score_breakdown\": {\"problem_severity\": 0, \"market_potential\": 0, \"feasibility\": 0, \"differentiation\": 0}
}";

static TEMPLATES: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    for (id, template) in [
        (StageId::Summary, SUMMARY_PROMPT),
        (StageId::TargetUser, TARGET_USER_PROMPT),
        (StageId::MarketAnalysis, MARKET_ANALYSIS_PROMPT),
        (StageId::Strategy, STRATEGY_PROMPT),
        (StageId::Scoring, SCORING_PROMPT),
    ] {
        registry
            .register_template_string(id.as_str(), template)
            .expect("static prompt template must compile");
    }
    registry
});

/// Renders the prompt for one stage from the accumulated context.
pub(crate) fn render(id: StageId, ctx: &StageContext<'_>) -> Result<String, StageError> {
    // Answers are sorted by question key so identical inputs render
    // identical prompts.
    let mut answers: Vec<(&String, &String)> = ctx.answers().iter().collect();
    answers.sort();
    let answers: Vec<serde_json::Value> = answers
        .into_iter()
        .map(|(question, answer)| json!({ "question": question, "answer": answer }))
        .collect();

    let data = json!({
        "idea_title": ctx.idea().title,
        "idea_description": ctx.idea().description,
        "industry": ctx.idea().industry,
        "answers": answers,
        "prior_context": serde_json::to_string_pretty(&ctx.prior_as_json()).unwrap_or_default(),
    });

    TEMPLATES
        .render(id.as_str(), &data)
        .map_err(|e| StageError::ExecutionFailed(e.to_string()))
}
