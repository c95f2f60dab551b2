//! Filter compilation.
//!
//! The "latest year" lookup is the only asynchronous step and runs first.
//! The resulting filter is then produced by applying an ordered rule table
//! where later rules override earlier ones: latest, explicit year, explicit
//! range.

use crate::predicate::Condition;
use crate::store::MetadataStore;
use crate::types::{ParsedIntent, RetrievalFilter};
use nss_core::AppResult;
use std::sync::Arc;

type Rule = fn(&ParsedIntent, Option<i32>, &mut RetrievalFilter);

/// Precedence table, lowest first.
const RULES: &[(&str, Rule)] = &[
    ("country", apply_country),
    ("latest", apply_latest),
    ("explicit_year", apply_year),
    ("explicit_range", apply_range),
];

fn apply_country(intent: &ParsedIntent, _: Option<i32>, filter: &mut RetrievalFilter) {
    filter.country = intent.country.clone();
}

fn apply_latest(intent: &ParsedIntent, latest: Option<i32>, filter: &mut RetrievalFilter) {
    if intent.country.is_some() && intent.wants_latest {
        if let Some(year) = latest {
            filter.year_min = Some(year);
            filter.year_max = Some(year);
        }
    }
}

fn apply_year(intent: &ParsedIntent, _: Option<i32>, filter: &mut RetrievalFilter) {
    if let Some(year) = intent.year {
        filter.year_min = Some(year);
        filter.year_max = Some(year);
    }
}

fn apply_range(intent: &ParsedIntent, _: Option<i32>, filter: &mut RetrievalFilter) {
    if intent.year.is_some() {
        return;
    }
    if let Some(year_min) = intent.year_min {
        filter.year_min = Some(year_min);
    }
    if let Some(year_max) = intent.year_max {
        filter.year_max = Some(year_max);
    }
}

/// Build a filter from an intent and an already-resolved latest year.
pub fn compile_filter(intent: &ParsedIntent, latest_year: Option<i32>) -> RetrievalFilter {
    let mut filter = RetrievalFilter::default();
    for (name, rule) in RULES {
        rule(intent, latest_year, &mut filter);
        tracing::trace!(rule = name, ?filter, "Applied filter rule");
    }
    filter
}

/// Compiles intents into filters, resolving "latest" against the store.
pub struct FilterCompiler {
    metadata: Arc<dyn MetadataStore>,
}

impl FilterCompiler {
    pub fn new(metadata: Arc<dyn MetadataStore>) -> Self {
        Self { metadata }
    }

    pub async fn compile(&self, intent: &ParsedIntent) -> AppResult<RetrievalFilter> {
        let latest_year = match (&intent.country, intent.wants_latest) {
            (Some(country), true) => {
                let year = self.latest_year(country).await?;
                if year.is_none() {
                    tracing::warn!(country = %country, "No dated documents; latest year unresolved");
                }
                year
            }
            _ => None,
        };

        Ok(compile_filter(intent, latest_year))
    }

    /// Most recent year among chunks whose country matches exactly.
    pub async fn latest_year(&self, country: &str) -> AppResult<Option<i32>> {
        let rows = self
            .metadata
            .fetch_where(&Condition::country_eq(country))
            .await?;
        Ok(rows.iter().filter_map(|meta| meta.year).max())
    }
}
