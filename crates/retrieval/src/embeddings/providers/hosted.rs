//! OpenAI-compatible `/embeddings` provider (OpenRouter, OpenAI).

use super::ollama::check_dimensions;
use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use nss_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Hosted embedding provider speaking the OpenAI embeddings protocol.
#[derive(Debug, Clone)]
pub struct HostedProvider {
    client: Client,
    provider: String,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl HostedProvider {
    pub fn new(config: &EmbeddingConfig, api_key: &str) -> AppResult<Self> {
        let base_url = config.endpoint_or_default();
        if base_url.is_empty() {
            return Err(AppError::Config(format!(
                "No endpoint configured for embedding provider '{}'",
                config.provider
            )));
        }

        Ok(Self {
            client: Client::new(),
            provider: config.provider.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Restore input order and validate every vector.
    fn collect_embeddings(
        &self,
        response: EmbeddingResponse,
        expected: usize,
    ) -> AppResult<Vec<Vec<f32>>> {
        if response.data.len() != expected {
            return Err(AppError::Embedding(format!(
                "{} returned {} embeddings for {} inputs",
                self.provider,
                response.data.len(),
                expected
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        data.into_iter()
            .map(|d| check_dimensions(&self.model, d.embedding, self.dimensions))
            .collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HostedProvider {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            provider = %self.provider,
            model = %self.model,
            count = texts.len(),
            "Requesting embeddings"
        );

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::Embedding(format!("Failed to send request to {}: {}", self.provider, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Embedding(format!(
                "{} embeddings API error ({}): {}",
                self.provider, status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Embedding(format!("Failed to parse {} response: {}", self.provider, e))
        })?;

        self.collect_embeddings(body, texts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(dimensions: usize) -> HostedProvider {
        let config = EmbeddingConfig {
            provider: "openrouter".to_string(),
            model: "openai/text-embedding-3-small".to_string(),
            dimensions,
            endpoint: None,
        };
        HostedProvider::new(&config, "sk-test").unwrap()
    }

    #[test]
    fn test_default_endpoint() {
        assert_eq!(provider(2).base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_request_shape() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let json = serde_json::to_value(EmbeddingRequest {
            model: "m",
            input: &texts,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"model": "m", "input": ["a", "b"]}));
    }

    #[test]
    fn test_collect_restores_order() {
        let response: EmbeddingResponse = serde_json::from_str(
            r#"{"data":[{"index":1,"embedding":[0.0,1.0]},{"index":0,"embedding":[1.0,0.0]}]}"#,
        )
        .unwrap();

        let embeddings = provider(2).collect_embeddings(response, 2).unwrap();
        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_collect_rejects_wrong_dimension() {
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"index":0,"embedding":[1.0,0.0,0.0]}]}"#).unwrap();
        assert!(provider(2).collect_embeddings(response, 1).is_err());
    }

    #[test]
    fn test_collect_rejects_missing_items() {
        let response: EmbeddingResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(provider(2).collect_embeddings(response, 1).is_err());
    }
}
