//! Embedding configuration resolved from the application config.

use nss_core::{AppConfig, AppError, AppResult};
use nss_llm::ProviderType;
use serde::{Deserialize, Serialize};

/// Settings needed to construct an embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "mock", "openrouter", "openai", "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Base URL of the embedding API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    /// Resolve the active embedding provider from the application config.
    pub fn from_app_config(config: &AppConfig) -> AppResult<Self> {
        let provider = config.embedding_provider().to_string();

        if provider == "mock" {
            return Ok(Self {
                dimensions: config.embedding.dimensions,
                ..Self::default()
            });
        }

        let provider_type = ProviderType::parse(&provider).ok_or_else(|| {
            AppError::Config(format!("Unknown embedding provider: '{}'", provider))
        })?;

        let endpoint = config
            .get_provider_config(&provider)
            .and_then(|p| p.endpoint())
            .unwrap_or(provider_type.default_endpoint())
            .to_string();

        Ok(Self {
            provider,
            model: config.embedding_model()?,
            dimensions: config.embedding.dimensions,
            endpoint: Some(endpoint),
        })
    }

    /// Configured endpoint, or the provider's default.
    pub fn endpoint_or_default(&self) -> String {
        self.endpoint
            .clone()
            .or_else(|| {
                ProviderType::parse(&self.provider).map(|p| p.default_endpoint().to_string())
            })
            .unwrap_or_default()
    }
}
