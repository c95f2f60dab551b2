//! Turns prompt definitions into model requests.

use nss_core::AppResult;
use nss_llm::LlmRequest;
use nss_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;

/// Render `prompt` with `variables` into a request for `model`.
///
/// The definition's `maxTokens` wins over `default_max_tokens`.
pub(crate) fn render_request(
    prompt: &PromptDefinition,
    variables: &[(&str, &str)],
    model: &str,
    default_max_tokens: u32,
) -> AppResult<LlmRequest> {
    let variables: HashMap<String, String> = variables
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let built = build_prompt(prompt, variables)?;
    let max_tokens = built.metadata.max_tokens.unwrap_or(default_max_tokens);

    let mut request = LlmRequest::new(built.user, model).with_max_tokens(max_tokens);
    if let Some(system) = built.system {
        request = request.with_system(system);
    }

    Ok(request)
}
