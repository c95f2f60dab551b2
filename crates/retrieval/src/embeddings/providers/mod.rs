//! Concrete embedding providers.

pub mod hosted;
pub mod mock;
pub mod ollama;

pub use hosted::HostedProvider;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
