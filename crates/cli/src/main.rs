//! NSS Search CLI
//!
//! Main entry point for the `nss` command-line tool. Answers questions over
//! national security strategy documents and serves the HTTP API.

mod commands;
mod runtime;
mod server;

use clap::{Parser, Subcommand};
use commands::{AskCommand, RetrieveCommand, ServeCommand, StatsCommand};
use nss_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use std::path::PathBuf;
use tracing::Instrument;

/// NSS Search - question answering over national security strategies
#[derive(Parser, Debug)]
#[command(name = "nss")]
#[command(about = "Question answering over national security strategy documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "NSS_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "NSS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openrouter, openai, ollama)
    #[arg(short, long, global = true, env = "NSS_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "NSS_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve(ServeCommand),

    /// Answer a question from the indexed documents
    Ask(AskCommand),

    /// Show the chunks a query retrieves, without an answer
    Retrieve(RetrieveCommand),

    /// Summarize the indexed corpus
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace, cli.config)?.with_overrides(
        None,
        None,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    )?;

    let log_format = match &cli.command {
        Commands::Serve(cmd) if cmd.json_logs => LogFormat::Json,
        _ => LogFormat::Pretty,
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("NSS Search starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Retrieve(_) => "retrieve",
        Commands::Stats(_) => "stats",
    };

    let result = async {
        match cli.command {
            Commands::Serve(cmd) => cmd.execute(&config).await,
            Commands::Ask(cmd) => cmd.execute(&config).await,
            Commands::Retrieve(cmd) => cmd.execute(&config).await,
            Commands::Stats(cmd) => cmd.execute(&config).await,
        }
    }
    .instrument(tracing::info_span!("command", name = command_name))
    .await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
