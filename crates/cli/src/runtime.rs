//! Process-wide wiring: model client, embedder and index, opened once.

use nss_core::{config::AppConfig, AppError, AppResult};
use nss_llm::{create_client, LlmClient};
use nss_retrieval::{
    create_provider, EmbeddingConfig, EmbeddingProvider, LanceDbStore, MetadataStore,
    PipelineSettings, QueryPipeline,
};
use std::sync::Arc;

/// Completion client for the active provider.
pub fn llm_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let endpoint = config
        .get_provider_config(&config.provider)
        .and_then(|p| p.endpoint());
    let api_key = config.resolve_api_key(&config.provider);

    create_client(&config.provider, endpoint, api_key.as_deref()).map_err(AppError::Config)
}

/// Embedder for the active embedding provider.
pub fn embedder(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let embedding_config = EmbeddingConfig::from_app_config(config)?;
    let api_key = config.resolve_api_key(config.embedding_provider());

    create_provider(&embedding_config, api_key.as_deref())
}

/// Validate the configuration, open the index and build the pipeline.
pub async fn open_pipeline(config: &AppConfig) -> AppResult<QueryPipeline> {
    config.validate()?;

    let llm = llm_client(config)?;
    let embedder = embedder(config)?;

    let index_path = config.index_path();
    let store = Arc::new(
        LanceDbStore::open(&index_path, &config.index.table, config.embedding.dimensions).await?,
    );
    let chunks = store.count().await?;
    tracing::info!(
        path = %index_path.display(),
        table = %config.index.table,
        chunks,
        "Loaded vector index"
    );

    QueryPipeline::new(
        llm,
        embedder,
        store.clone(),
        store,
        &PipelineSettings::from_config(config),
    )
}
