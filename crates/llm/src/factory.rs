//! LLM provider factory.
//!
//! Creates completion clients from a provider name, an optional endpoint
//! override and an optional API key.

use crate::client::LlmClient;
use crate::providers::{HostedClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openrouter", "openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by hosted providers)
///
/// # Errors
/// Returns an error if the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());

    match provider_type {
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_base_url(base_url))),
        ProviderType::OpenRouter | ProviderType::OpenAI => {
            let api_key = api_key
                .ok_or_else(|| format!("{} provider requires API key", provider_type.as_str()))?;
            Ok(Arc::new(HostedClient::new(
                provider_type.as_str(),
                base_url,
                api_key,
            )))
        }
    }
}
