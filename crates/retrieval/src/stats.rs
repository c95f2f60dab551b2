//! Corpus statistics.

use crate::store::MetadataStore;
use crate::types::{ChunkMetadata, CorpusStats};
use nss_core::AppResult;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Page size for the metadata scan.
pub const STATS_BATCH_SIZE: usize = 5000;

/// Label for chunks stored without a country.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

#[derive(Debug, Default)]
struct Accumulator {
    countries: BTreeSet<String>,
    years: BTreeSet<i32>,
}

impl Accumulator {
    fn add(&mut self, meta: &ChunkMetadata) {
        let country = meta.country.as_deref().unwrap_or(UNKNOWN_COUNTRY);
        if !self.countries.contains(country) {
            self.countries.insert(country.to_string());
        }
        if let Some(year) = meta.year {
            self.years.insert(year);
        }
    }

    fn finish(self, total_chunks: usize) -> CorpusStats {
        let year_range = match (self.years.first(), self.years.last()) {
            (Some(min), Some(max)) => Some([*min, *max]),
            _ => None,
        };

        CorpusStats {
            total_chunks,
            countries: self.countries.len(),
            country_list: self.countries.into_iter().collect(),
            year_range,
        }
    }
}

/// Summarizes the corpus by paging through chunk metadata.
pub struct StatsAggregator {
    metadata: Arc<dyn MetadataStore>,
    batch_size: usize,
}

impl StatsAggregator {
    pub fn new(metadata: Arc<dyn MetadataStore>) -> Self {
        Self {
            metadata,
            batch_size: STATS_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub async fn collect(&self) -> AppResult<CorpusStats> {
        let total = self.metadata.count().await?;
        let mut acc = Accumulator::default();

        let mut offset = 0;
        while offset < total {
            let page = self.metadata.fetch_page(self.batch_size, offset).await?;
            if page.is_empty() {
                break;
            }
            page.iter().for_each(|meta| acc.add(meta));
            offset += self.batch_size;
        }

        let stats = acc.finish(total);
        tracing::info!(
            total_chunks = stats.total_chunks,
            countries = stats.countries,
            "Corpus stats collected"
        );
        Ok(stats)
    }
}
