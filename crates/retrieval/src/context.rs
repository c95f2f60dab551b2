//! Citation-tagged context assembly.

use crate::types::{RankedChunk, RetrievalResult, Source};

/// Separator placed between context blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// `[Source N: country year, doc p.page]` header followed by the text.
pub fn format_block(ranked: &RankedChunk) -> String {
    let meta = &ranked.chunk.metadata;
    let year = meta
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".to_string());

    format!(
        "[Source {}: {} {}, {} p.{}]\n{}",
        ranked.rank,
        meta.country.as_deref().unwrap_or("Unknown"),
        year,
        meta.doc_name,
        meta.page,
        ranked.chunk.text
    )
}

/// Context text for the answer prompt, one block per chunk in rank order.
pub fn assemble_context(result: &RetrievalResult) -> String {
    result
        .iter()
        .map(format_block)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Source list aligned with the context blocks.
pub fn collect_sources(result: &RetrievalResult) -> Vec<Source> {
    result
        .iter()
        .map(|ranked| Source::from(&ranked.chunk.metadata))
        .collect()
}
