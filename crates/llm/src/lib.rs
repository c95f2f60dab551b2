//! LLM integration crate for NSS Search.
//!
//! Provider-agnostic access to generative models through the [`LlmClient`]
//! trait. The pipeline issues exactly two kinds of calls through it: intent
//! parsing (strict JSON) and answer synthesis (markdown prose).
//!
//! # Providers
//! - **Hosted**: any OpenAI-compatible chat-completions API (OpenRouter by default, OpenAI)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use nss_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Summarize the NSS", "llama3.2").with_system("Be brief.");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{HostedClient, OllamaClient};
pub use types::ProviderType;
