//! Embedding, model and store failures surface as server-side errors.

use super::support::{
    corpus, pipeline_from, settings, BrokenEmbedder, ScriptedLlm, UnreachableStore, DIMS,
};
use crate::embeddings::providers::MockProvider;
use crate::types::RetrievalFilter;
use nss_core::AppError;
use std::sync::Arc;
use tempfile::TempDir;

const UNFILTERED_INTENT: &str = r#"{"country": null, "search_query": "cyber threats"}"#;
const LATEST_US_INTENT: &str =
    r#"{"country": "United States", "wants_latest": true, "search_query": "priorities"}"#;

fn assert_server_error(err: &AppError) {
    assert!(!err.is_client_error(), "{} should not be a client error", err);
}

#[tokio::test]
async fn test_embedding_failure_propagates() {
    let workspace = TempDir::new().unwrap();
    let llm = Arc::new(ScriptedLlm::new(&[UNFILTERED_INTENT, "unused"]));
    let store = corpus().await;
    let pipeline = pipeline_from(
        llm.clone(),
        Arc::new(BrokenEmbedder::Unavailable),
        store.clone(),
        store,
        &settings(workspace.path()),
    );

    let err = pipeline.resolve_query("Cyber threats?").await.unwrap_err();

    assert!(matches!(err, AppError::Embedding(_)));
    assert!(err.to_string().contains("service unavailable"));
    assert_server_error(&err);
    assert_eq!(llm.calls(), 1, "answer synthesizer must not run");
}

#[tokio::test]
async fn test_embedding_dimension_mismatch_is_rejected() {
    let workspace = TempDir::new().unwrap();
    let llm = Arc::new(ScriptedLlm::new(&[UNFILTERED_INTENT, "unused"]));
    let store = corpus().await;
    let pipeline = pipeline_from(
        llm.clone(),
        Arc::new(BrokenEmbedder::WrongDimensions(DIMS + 1)),
        store.clone(),
        store,
        &settings(workspace.path()),
    );

    let err = pipeline.resolve_query("Cyber threats?").await.unwrap_err();

    assert!(matches!(err, AppError::Embedding(_)));
    assert!(err
        .to_string()
        .contains(&format!("expected {}, got {}", DIMS, DIMS + 1)));
    assert_server_error(&err);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_vector_store_failure_propagates() {
    let workspace = TempDir::new().unwrap();
    let llm = Arc::new(ScriptedLlm::new(&[UNFILTERED_INTENT, "unused"]));
    let pipeline = pipeline_from(
        llm.clone(),
        Arc::new(MockProvider::new(DIMS)),
        Arc::new(UnreachableStore),
        corpus().await,
        &settings(workspace.path()),
    );

    let err = pipeline.resolve_query("Cyber threats?").await.unwrap_err();

    assert!(matches!(err, AppError::Store(_)));
    assert_server_error(&err);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_latest_year_lookup_failure_propagates() {
    let workspace = TempDir::new().unwrap();
    let llm = Arc::new(ScriptedLlm::new(&[LATEST_US_INTENT, "unused"]));
    let pipeline = pipeline_from(
        llm.clone(),
        Arc::new(MockProvider::new(DIMS)),
        corpus().await,
        Arc::new(UnreachableStore),
        &settings(workspace.path()),
    );

    let err = pipeline
        .resolve_query("Latest US strategy?")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Store(_)));
    assert_server_error(&err);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_retrieve_and_stats_surface_store_errors() {
    let workspace = TempDir::new().unwrap();
    let llm = Arc::new(ScriptedLlm::new(&[]));
    let pipeline = pipeline_from(
        llm.clone(),
        Arc::new(MockProvider::new(DIMS)),
        Arc::new(UnreachableStore),
        Arc::new(UnreachableStore),
        &settings(workspace.path()),
    );

    let err = pipeline
        .retrieve("cyber threats", &RetrievalFilter::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
    assert_server_error(&err);

    let err = pipeline.get_stats().await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));

    assert_eq!(llm.calls(), 0);
}
