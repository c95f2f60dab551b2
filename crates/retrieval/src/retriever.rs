//! Filtered nearest-neighbor retrieval.

use crate::embeddings::EmbeddingProvider;
use crate::predicate::Predicate;
use crate::store::VectorStore;
use crate::types::{RetrievalFilter, RetrievalResult};
use nss_core::{AppError, AppResult};
use std::sync::Arc;

/// Embeds a topical query and searches the vector store under a filter.
pub struct VectorRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl VectorRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Default result count.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve with the default result count.
    pub async fn retrieve(
        &self,
        query: &str,
        filter: &RetrievalFilter,
    ) -> AppResult<RetrievalResult> {
        self.retrieve_top_k(query, filter, self.top_k).await
    }

    pub async fn retrieve_top_k(
        &self,
        query: &str,
        filter: &RetrievalFilter,
        top_k: usize,
    ) -> AppResult<RetrievalResult> {
        let embedding = self.embedder.embed(query).await?;
        if embedding.len() != self.embedder.dimensions() {
            return Err(AppError::Embedding(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.embedder.dimensions(),
                embedding.len()
            )));
        }

        let predicate = Predicate::from_filter(filter);
        tracing::debug!(
            conditions = predicate.conditions().len(),
            top_k,
            "Running filtered vector search"
        );

        let scored = self.store.nearest(&embedding, top_k, &predicate).await?;
        let result = RetrievalResult::from_scored(scored);

        match (result.chunks.first(), result.chunks.last()) {
            (Some(top), Some(lowest)) => tracing::info!(
                "Retrieved {} chunks (top score: {:.3}, lowest: {:.3})",
                result.len(),
                top.score,
                lowest.score
            ),
            _ => tracing::info!("No chunks matched the query and filter"),
        }

        Ok(result)
    }
}
