//! In-process store backed by a vector of embedded chunks.

use super::{MetadataStore, VectorStore};
use crate::predicate::{Condition, Predicate};
use crate::types::{Chunk, ChunkMetadata};
use nss_core::{AppError, AppResult};

/// Brute-force store ranking by cosine similarity.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: Vec<(Chunk, Vec<f32>)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk with its embedding.
    pub fn insert(&mut self, chunk: Chunk, embedding: Vec<f32>) {
        self.rows.push((chunk, embedding));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait::async_trait]
impl MetadataStore for InMemoryStore {
    async fn count(&self) -> AppResult<usize> {
        Ok(self.rows.len())
    }

    async fn fetch_page(&self, limit: usize, offset: usize) -> AppResult<Vec<ChunkMetadata>> {
        Ok(self
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(chunk, _)| chunk.metadata.clone())
            .collect())
    }

    async fn fetch_where(&self, condition: &Condition) -> AppResult<Vec<ChunkMetadata>> {
        Ok(self
            .rows
            .iter()
            .filter(|(chunk, _)| condition.matches(&chunk.metadata))
            .map(|(chunk, _)| chunk.metadata.clone())
            .collect())
    }
}

#[async_trait::async_trait]
impl VectorStore for InMemoryStore {
    async fn nearest(
        &self,
        embedding: &[f32],
        top_k: usize,
        predicate: &Predicate,
    ) -> AppResult<Vec<(Chunk, f32)>> {
        let mut scored = Vec::new();
        for (chunk, stored) in &self.rows {
            if stored.len() != embedding.len() {
                return Err(AppError::Store(format!(
                    "Query embedding dimension mismatch: expected {}, got {}",
                    stored.len(),
                    embedding.len()
                )));
            }
            if predicate.matches(&chunk.metadata) {
                scored.push((chunk.clone(), cosine_similarity(embedding, stored)));
            }
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        tracing::debug!(
            matched = scored.len(),
            top_k,
            "In-memory nearest-neighbor search complete"
        );

        Ok(scored)
    }
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, country: &str, year: Option<i32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: format!("text {}", id),
            metadata: ChunkMetadata::new(country, year, "doc.pdf", 1),
        }
    }

    fn store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.insert(chunk("a", "Japan", Some(2013)), vec![1.0, 0.0]);
        store.insert(chunk("b", "Japan", Some(2022)), vec![0.6, 0.8]);
        store.insert(chunk("c", "China", None), vec![0.0, 1.0]);
        store
    }

    #[tokio::test]
    async fn test_nearest_orders_by_similarity() {
        let results = store()
            .nearest(&[1.0, 0.1], 10, &Predicate::Unconstrained)
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|(c, _)| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(results[0].1 > results[1].1);
    }

    #[tokio::test]
    async fn test_nearest_applies_predicate_and_limit() {
        let predicate = Predicate::Single(Condition::country_eq("Japan"));
        let results = store().nearest(&[0.0, 1.0], 1, &predicate).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.id, "b");
    }

    #[tokio::test]
    async fn test_nearest_dimension_mismatch() {
        let result = store()
            .nearest(&[1.0, 0.0, 0.0], 10, &Predicate::Unconstrained)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_metadata_access() {
        let store = store();
        assert_eq!(store.count().await.unwrap(), 3);

        let page = store.fetch_page(2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].year, Some(2022));

        let japan = store
            .fetch_where(&Condition::country_eq("Japan"))
            .await
            .unwrap();
        assert_eq!(japan.len(), 2);

        assert!(store.fetch_page(10, 5).await.unwrap().is_empty());
    }
}
