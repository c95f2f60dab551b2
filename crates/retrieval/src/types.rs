//! Core data types for NSS retrieval.

use serde::{Deserialize, Serialize};

/// Metadata attached to every stored chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Issuing country; older corpora contain rows without one
    pub country: Option<String>,

    /// Publication year, when known
    pub year: Option<i32>,

    /// Source document name
    pub doc_name: String,

    /// Page within the source document
    pub page: i32,
}

impl ChunkMetadata {
    /// Create metadata for a chunk with a known country.
    pub fn new(country: &str, year: Option<i32>, doc_name: &str, page: i32) -> Self {
        Self {
            country: Some(country.to_string()),
            year,
            doc_name: doc_name.to_string(),
            page,
        }
    }
}

/// Immutable unit of retrievable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Row identifier in the store
    pub id: String,

    /// Excerpt text
    pub text: String,

    /// Filterable metadata
    pub metadata: ChunkMetadata,
}

/// Structured search intent extracted from a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIntent {
    pub country: Option<String>,
    pub year: Option<i32>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub wants_latest: bool,

    /// Topical query that gets embedded; never empty
    pub search_query: String,
}

impl ParsedIntent {
    /// Intent that searches for the raw question with no filters.
    pub fn fallback(question: &str) -> Self {
        Self {
            country: None,
            year: None,
            year_min: None,
            year_max: None,
            wants_latest: false,
            search_query: question.to_string(),
        }
    }
}

/// Metadata constraints applied to a vector search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_min: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_max: Option<i32>,
}

impl RetrievalFilter {
    /// Whether no constraint is set.
    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.year_min.is_none() && self.year_max.is_none()
    }
}

/// A retrieved chunk with its 1-based position in the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChunk {
    pub rank: usize,
    pub chunk: Chunk,

    /// Store relevance score, higher is closer
    pub score: f32,
}

/// Ordered result of one nearest-neighbor query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub chunks: Vec<RankedChunk>,
}

impl RetrievalResult {
    /// Assign ranks in store order.
    pub fn from_scored(scored: Vec<(Chunk, f32)>) -> Self {
        let chunks = scored
            .into_iter()
            .enumerate()
            .map(|(i, (chunk, score))| RankedChunk {
                rank: i + 1,
                chunk,
                score,
            })
            .collect();
        Self { chunks }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedChunk> {
        self.chunks.iter()
    }
}

/// Citation entry returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub country: Option<String>,
    pub year: Option<i32>,
    pub doc_name: String,
    pub page: i32,
}

impl From<&ChunkMetadata> for Source {
    fn from(meta: &ChunkMetadata) -> Self {
        Self {
            country: meta.country.clone(),
            year: meta.year,
            doc_name: meta.doc_name.clone(),
            page: meta.page,
        }
    }
}

/// Full response to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    pub parsed_query: ParsedIntent,
    pub filters: RetrievalFilter,
}

/// Corpus summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_chunks: usize,
    pub countries: usize,
    pub country_list: Vec<String>,
    pub year_range: Option<[i32; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_serializes_as_empty_object() {
        let json = serde_json::to_string(&RetrievalFilter::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_filter_omits_unset_bounds() {
        let filter = RetrievalFilter {
            country: Some("Japan".to_string()),
            year_min: Some(2010),
            year_max: None,
        };
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({"country": "Japan", "year_min": 2010}));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_fallback_intent() {
        let intent = ParsedIntent::fallback("What about cyber?");
        assert_eq!(intent.search_query, "What about cyber?");
        assert!(intent.country.is_none());
        assert!(!intent.wants_latest);
    }

    #[test]
    fn test_ranks_are_one_based() {
        let chunk = |id: &str| Chunk {
            id: id.to_string(),
            text: "t".to_string(),
            metadata: ChunkMetadata::new("Japan", Some(2022), "jp.pdf", 1),
        };
        let result = RetrievalResult::from_scored(vec![(chunk("a"), 0.9), (chunk("b"), 0.5)]);

        let ranks: Vec<usize> = result.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_stats_year_range_null() {
        let stats = CorpusStats {
            total_chunks: 0,
            countries: 0,
            country_list: vec![],
            year_range: None,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["year_range"].is_null());
    }
}
