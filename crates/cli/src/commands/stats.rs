//! Stats command handler.

use crate::runtime;
use clap::Args;
use nss_core::{config::AppConfig, AppResult};
use nss_retrieval::CorpusStats;

/// Summarize the indexed corpus
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let pipeline = runtime::open_pipeline(config).await?;
        let stats = pipeline.get_stats().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print!("{}", render(&stats));
        }

        Ok(())
    }
}

fn render(stats: &CorpusStats) -> String {
    let years = match stats.year_range {
        Some([min, max]) => format!("{}-{}", min, max),
        None => "none".to_string(),
    };

    format!(
        "Chunks:    {}\nCountries: {}\nYears:     {}\n\n{}\n",
        stats.total_chunks,
        stats.countries,
        years,
        stats.country_list.join(", ")
    )
}
