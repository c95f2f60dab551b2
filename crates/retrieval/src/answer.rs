//! Grounded answer synthesis.

use crate::prompting::render_request;
use nss_core::AppResult;
use nss_llm::LlmClient;
use nss_prompt::PromptDefinition;
use std::sync::Arc;

/// Completion budget for the answer call.
pub const ANSWER_MAX_TOKENS: u32 = 1500;

/// Produces a cited markdown answer from retrieved excerpts.
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            llm,
            model: model.into(),
            prompt,
        }
    }

    pub async fn synthesize(&self, question: &str, context: &str) -> AppResult<String> {
        let request = render_request(
            &self.prompt,
            &[("question", question), ("context", context)],
            &self.model,
            ANSWER_MAX_TOKENS,
        )?;

        let response = self.llm.complete(&request).await?;
        tracing::debug!(
            model = %response.model,
            completion_tokens = response.usage.completion_tokens,
            "Answer synthesized"
        );

        Ok(response.content)
    }
}
