//! Retrieve command handler.
//!
//! Runs filtered vector search only. Useful for checking what the model
//! would be shown for a query.

use super::ask::source_label;
use crate::runtime;
use clap::Args;
use nss_core::{config::AppConfig, AppResult};
use nss_retrieval::countries::canonical_country;
use nss_retrieval::{RetrievalFilter, RetrievalResult, Source};

/// Characters of chunk text shown per result.
const PREVIEW_CHARS: usize = 200;

/// Show the chunks a query retrieves, without an answer
#[derive(Args, Debug)]
pub struct RetrieveCommand {
    /// Search text
    pub query: String,

    /// Number of chunks to return (default from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Restrict to one country
    #[arg(long)]
    pub country: Option<String>,

    /// Earliest publication year
    #[arg(long)]
    pub year_min: Option<i32>,

    /// Latest publication year
    #[arg(long)]
    pub year_max: Option<i32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RetrieveCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing retrieve command");

        let filter = self.filter();
        tracing::debug!(?filter, "Retrieval filter");

        let pipeline = runtime::open_pipeline(config).await?;
        let result = pipeline.retrieve(&self.query, &filter, self.top_k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if result.is_empty() {
            println!("No chunks matched.");
        } else {
            print!("{}", render(&result));
        }

        Ok(())
    }

    fn filter(&self) -> RetrievalFilter {
        RetrievalFilter {
            country: self.country.as_deref().map(|c| {
                canonical_country(c)
                    .map(str::to_string)
                    .unwrap_or_else(|| c.trim().to_string())
            }),
            year_min: self.year_min,
            year_max: self.year_max,
        }
    }
}

fn render(result: &RetrievalResult) -> String {
    let mut out = String::new();
    for ranked in result.iter() {
        let source = Source::from(&ranked.chunk.metadata);
        out.push_str(&format!(
            "[{}] {:.3}  {}\n    {}\n",
            ranked.rank,
            ranked.score,
            source_label(&source),
            preview(&ranked.chunk.text)
        ));
    }
    out
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    }
}
