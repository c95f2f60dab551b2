//! Store seams used by the query pipeline.
//!
//! Both traits are read-only: the corpus is built and loaded elsewhere.

pub mod lance;
pub mod memory;

pub use lance::LanceDbStore;
pub use memory::InMemoryStore;

use crate::predicate::{Condition, Predicate};
use crate::types::{Chunk, ChunkMetadata};
use nss_core::AppResult;

/// Metadata-only access to the corpus.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// Total number of stored chunks.
    async fn count(&self) -> AppResult<usize>;

    /// One page of metadata in store order.
    async fn fetch_page(&self, limit: usize, offset: usize) -> AppResult<Vec<ChunkMetadata>>;

    /// Metadata of every chunk satisfying `condition`.
    async fn fetch_where(&self, condition: &Condition) -> AppResult<Vec<ChunkMetadata>>;
}

/// Nearest-neighbor search over chunk embeddings.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Up to `top_k` chunks satisfying `predicate`, closest first, each
    /// paired with a relevance score where higher is closer.
    async fn nearest(
        &self,
        embedding: &[f32],
        top_k: usize,
        predicate: &Predicate,
    ) -> AppResult<Vec<(Chunk, f32)>>;
}
