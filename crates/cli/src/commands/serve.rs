//! Serve command handler.

use crate::{runtime, server};
use clap::Args;
use nss_core::{config::AppConfig, AppResult};
use std::sync::Arc;

/// Serve the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (default from config, 0.0.0.0:8000)
    #[arg(long)]
    pub bind: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let pipeline = Arc::new(runtime::open_pipeline(config).await?);

        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);
        let listener = tokio::net::TcpListener::bind(bind).await?;
        tracing::info!(address = %bind, "Listening");

        axum::serve(listener, server::router(pipeline))
            .with_graceful_shutdown(server::shutdown_signal())
            .await?;

        Ok(())
    }
}
