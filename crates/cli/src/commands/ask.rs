//! Ask command handler.
//!
//! Runs one question through the full pipeline and prints the answer with
//! its sources.

use crate::runtime;
use clap::Args;
use nss_core::{config::AppConfig, AppResult};
use nss_retrieval::{QueryResponse, Source};

/// Answer a question from the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let pipeline = runtime::open_pipeline(config).await?;
        let response = pipeline.resolve_query(&self.question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print!("{}", render(&response));
        }

        Ok(())
    }
}

fn render(response: &QueryResponse) -> String {
    let mut out = format!("{}\n", response.answer.trim_end());

    if !response.sources.is_empty() {
        out.push_str("\nSources:\n");
        for (i, source) in response.sources.iter().enumerate() {
            out.push_str(&format!("  [{}] {}\n", i + 1, source_label(source)));
        }
    }

    out
}

pub(crate) fn source_label(source: &Source) -> String {
    let year = source
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".to_string());

    format!(
        "{} {}, {} p.{}",
        source.country.as_deref().unwrap_or("Unknown"),
        year,
        source.doc_name,
        source.page
    )
}
