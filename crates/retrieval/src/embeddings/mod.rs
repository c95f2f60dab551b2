//! Embedding providers.
//!
//! Turns query text into fixed-dimension vectors. The configured dimension
//! must match the vectors stored in the index.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
