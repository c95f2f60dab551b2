//! Query intent parsing.
//!
//! One model call turns a free-text question into a [`ParsedIntent`].
//! Anything wrong with the model's output degrades to an unfiltered search
//! for the raw question; transport failures of the call itself propagate.

use crate::countries::{canonical_country, country_list_text};
use crate::prompting::render_request;
use crate::types::ParsedIntent;
use nss_core::AppResult;
use nss_llm::LlmClient;
use nss_prompt::PromptDefinition;
use serde::Deserialize;
use std::sync::Arc;

/// Completion budget for the intent call.
pub const INTENT_MAX_TOKENS: u32 = 300;

/// Model output shape; every field may be absent or null.
#[derive(Debug, Deserialize)]
struct RawIntent {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    year_min: Option<i32>,
    #[serde(default)]
    year_max: Option<i32>,
    #[serde(default)]
    wants_latest: Option<bool>,
    #[serde(default)]
    search_query: Option<String>,
}

/// Extracts structured search intent with a generative model.
pub struct IntentParser {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    strict_countries: bool,
}

impl IntentParser {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            llm,
            model: model.into(),
            prompt,
            strict_countries: false,
        }
    }

    /// Drop unrecognized countries instead of passing them through.
    pub fn with_strict_countries(mut self, strict: bool) -> Self {
        self.strict_countries = strict;
        self
    }

    pub async fn parse(&self, question: &str) -> AppResult<ParsedIntent> {
        let countries = country_list_text();
        let request = render_request(
            &self.prompt,
            &[("countries", countries.as_str()), ("question", question)],
            &self.model,
            INTENT_MAX_TOKENS,
        )?;

        let response = self.llm.complete(&request).await?;
        tracing::debug!(raw = %response.content, "Intent model output");

        Ok(decode_intent(&response.content, question, self.strict_countries))
    }
}

/// Decode model output into an intent, falling back to the raw question.
pub fn decode_intent(raw: &str, question: &str, strict_countries: bool) -> ParsedIntent {
    let Some(json) = extract_json_object(raw) else {
        tracing::warn!("Intent output contained no JSON object; searching raw question");
        return ParsedIntent::fallback(question);
    };

    let parsed: RawIntent = match serde_json::from_str(json) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Intent output failed validation ({}); searching raw question", e);
            return ParsedIntent::fallback(question);
        }
    };

    let search_query = parsed
        .search_query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| question.to_string());

    ParsedIntent {
        country: parsed
            .country
            .and_then(|c| normalize_country(&c, strict_countries)),
        year: parsed.year,
        year_min: parsed.year_min,
        year_max: parsed.year_max,
        wants_latest: parsed.wants_latest.unwrap_or(false),
        search_query,
    }
}

/// Canonical spelling for known countries. Unknown names pass through
/// unless `strict` is set, in which case they are dropped.
fn normalize_country(name: &str, strict: bool) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }

    match canonical_country(trimmed) {
        Some(canonical) => Some(canonical.to_string()),
        None if strict => {
            tracing::warn!(country = %trimmed, "Dropping unsupported country");
            None
        }
        None => {
            tracing::warn!(country = %trimmed, "Country not in supported list; filter will match nothing");
            Some(trimmed.to_string())
        }
    }
}

/// Outermost `{...}` span, tolerating code fences and surrounding prose.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}
