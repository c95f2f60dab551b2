//! Retrieval-augmented question answering over national security strategy
//! documents.
//!
//! A question flows through [`intent`], [`filter`], [`retriever`],
//! [`context`] and [`answer`]; [`pipeline::QueryPipeline`] wires them
//! together over the [`store`] and [`embeddings`] seams.

pub mod answer;
pub mod context;
pub mod countries;
pub mod embeddings;
pub mod filter;
pub mod intent;
pub mod pipeline;
pub mod predicate;
mod prompting;
pub mod retriever;
pub mod stats;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use pipeline::{PipelineSettings, QueryPipeline, NO_RESULTS_ANSWER};
pub use predicate::{Condition, Predicate};
pub use store::{InMemoryStore, LanceDbStore, MetadataStore, VectorStore};
pub use types::{
    Chunk, ChunkMetadata, CorpusStats, ParsedIntent, QueryResponse, RankedChunk, RetrievalFilter,
    RetrievalResult, Source,
};
