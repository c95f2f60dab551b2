//! OpenAI-compatible chat-completions provider.
//!
//! Serves OpenRouter (default) and OpenAI, which share the
//! `POST {base}/chat/completions` request and response shapes.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use nss_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, PartialEq)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Client for OpenAI-compatible hosted APIs.
pub struct HostedClient {
    provider: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HostedClient {
    /// Create a client for `base_url` authenticated with a bearer key.
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn to_chat_request<'a>(&self, request: &'a LlmRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn convert_response(&self, request: &LlmRequest, response: ChatResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::Llm(format!("{} returned no completion choices", self.provider))
            })?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model.unwrap_or_else(|| request.model.clone()),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for HostedClient {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(provider = %self.provider, model = %request.model, "Sending chat completion request");

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.to_chat_request(request))
            .send()
            .await
            .map_err(|e| {
                AppError::Llm(format!("Failed to send request to {}: {}", self.provider, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "{} API error ({}): {}",
                self.provider, status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AppError::Llm(format!("Failed to parse {} response: {}", self.provider, e))
        })?;

        let converted = self.convert_response(request, chat_response)?;
        tracing::debug!(
            total_tokens = converted.usage.total_tokens,
            "Received chat completion"
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HostedClient {
        HostedClient::new("openrouter", "https://openrouter.ai/api/v1/", "sk-test")
    }

    #[test]
    fn test_base_url_normalized() {
        assert_eq!(client().base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_chat_request_has_system_then_user() {
        let request = LlmRequest::new("What is new?", "anthropic/claude-3.5-sonnet")
            .with_system("You are a parser")
            .with_max_tokens(300);
        let client = client();
        let chat = client.to_chat_request(&request);

        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1], ChatMessage { role: "user", content: "What is new?" });
        assert_eq!(chat.max_tokens, Some(300));

        let json = serde_json::to_value(&chat).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_chat_request_without_system() {
        let request = LlmRequest::new("Hi", "m");
        let client = client();
        let chat = client.to_chat_request(&request);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].role, "user");
    }

    #[test]
    fn test_convert_response() {
        let request = LlmRequest::new("Hi", "fallback-model");
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}],"usage":{"prompt_tokens":5,"completion_tokens":1}}"#,
        )
        .unwrap();

        let response = client().convert_response(&request, parsed).unwrap();
        assert_eq!(response.content, "Hello");
        assert_eq!(response.model, "fallback-model");
        assert_eq!(response.usage.total_tokens, 6);
    }

    #[test]
    fn test_convert_response_without_choices() {
        let request = LlmRequest::new("Hi", "m");
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(client().convert_response(&request, parsed).is_err());
    }
}
