//! HTTP API over the query pipeline.
//!
//! - `POST /api/query` with `{"query": "..."}` answers a question
//! - `GET /api/stats` summarizes the corpus
//! - `GET /health` reports liveness
//!
//! Blank queries are rejected with 400; every other failure is a 500 with
//! an `{"error": "..."}` body.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use nss_core::AppError;
use nss_retrieval::{CorpusStats, QueryPipeline, QueryResponse};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Body of `POST /api/query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Maps pipeline errors onto HTTP statuses.
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self.0, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let message = match self.0 {
            AppError::InvalidQuery(message) => message,
            err => err.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the API router around a shared pipeline.
pub fn router(pipeline: Arc<QueryPipeline>) -> Router {
    Router::new()
        .route("/api/query", post(query))
        .route("/api/stats", get(stats))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pipeline)
}

async fn query(
    State(pipeline): State<Arc<QueryPipeline>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let response = pipeline.resolve_query(&request.query).await?;
    tracing::info!(sources = response.sources.len(), "Answered query");
    Ok(Json(response))
}

async fn stats(
    State(pipeline): State<Arc<QueryPipeline>>,
) -> Result<Json<CorpusStats>, ApiError> {
    Ok(Json(pipeline.get_stats().await?))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use nss_core::AppResult;
    use nss_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
    use nss_retrieval::embeddings::providers::MockProvider;
    use nss_retrieval::{Chunk, ChunkMetadata, EmbeddingProvider, InMemoryStore, PipelineSettings};
    use serde_json::Value;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tower::ServiceExt;

    /// Answers intent requests with `intent` and everything else with `answer`.
    struct StubLlm {
        intent: &'static str,
        answer: AppResult<&'static str>,
        calls: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl LlmClient for StubLlm {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };

            let content = if call == 1 {
                self.intent.to_string()
            } else {
                match &self.answer {
                    Ok(answer) => answer.to_string(),
                    Err(_) => return Err(AppError::Llm("upstream timed out".to_string())),
                }
            };

            Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    async fn app(intent: &'static str, answer: AppResult<&'static str>) -> (Router, TempDir) {
        let workspace = TempDir::new().unwrap();
        let embedder = Arc::new(MockProvider::new(64));

        let mut store = InMemoryStore::new();
        for (id, country, year, text) in [
            ("uk21-3", "United Kingdom", 2021, "Global Britain in a competitive age."),
            ("uk15-8", "United Kingdom", 2015, "A secure and prosperous United Kingdom."),
            ("fr22-1", "France", 2022, "Strategic review and national resilience."),
        ] {
            let embedding = embedder.embed(text).await.unwrap();
            store.insert(
                Chunk {
                    id: id.to_string(),
                    text: text.to_string(),
                    metadata: ChunkMetadata::new(country, Some(year), &format!("{}.pdf", id), 1),
                },
                embedding,
            );
        }
        let store = Arc::new(store);

        let llm = Arc::new(StubLlm {
            intent,
            answer,
            calls: Mutex::new(0),
        });
        let settings = PipelineSettings {
            model: "stub-model".to_string(),
            top_k: 5,
            strict_countries: false,
            workspace: workspace.path().to_path_buf(),
        };
        let pipeline = QueryPipeline::new(llm, embedder, store.clone(), store, &settings).unwrap();

        (router(Arc::new(pipeline)), workspace)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_query(body: &str) -> Request<Body> {
        Request::post("/api/query")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _ws) = app("{}", Ok("unused")).await;
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_query_latest_uk() {
        let (router, _ws) = app(
            r#"{"country": "United Kingdom", "wants_latest": true, "search_query": "competitive age"}"#,
            Ok("The 2021 review [Source 1]."),
        )
        .await;

        let (status, body) = send(router, post_query(r#"{"query": "Latest UK strategy?"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "The 2021 review [Source 1].");
        assert_eq!(
            body["filters"],
            json!({ "country": "United Kingdom", "year_min": 2021, "year_max": 2021 })
        );
        assert_eq!(body["sources"].as_array().unwrap().len(), 1);
        assert_eq!(body["sources"][0]["doc_name"], "uk21-3.pdf");
        assert_eq!(body["parsed_query"]["wants_latest"], true);
    }

    #[tokio::test]
    async fn test_blank_query_is_bad_request() {
        let (router, _ws) = app("{}", Ok("unused")).await;

        let (status, body) = send(router, post_query(r#"{"query": "  "}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Query cannot be empty");
    }

    #[tokio::test]
    async fn test_model_failure_is_server_error() {
        let (router, _ws) = app(
            r#"{"country": "France", "search_query": "resilience"}"#,
            Err(AppError::Llm(String::new())),
        )
        .await;

        let (status, body) = send(router, post_query(r#"{"query": "France?"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("upstream timed out"));
    }

    #[tokio::test]
    async fn test_api_error_status_follows_client_classification() {
        let response = ApiError::from(AppError::InvalidQuery("Query cannot be empty".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Query cannot be empty" }));

        for err in [
            AppError::Store("table missing".to_string()),
            AppError::Embedding("dimension mismatch".to_string()),
            AppError::Config("no key".to_string()),
        ] {
            assert!(!err.is_client_error());
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[tokio::test]
    async fn test_stats() {
        let (router, _ws) = app("{}", Ok("unused")).await;
        let request = Request::get("/api/stats").body(Body::empty()).unwrap();

        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_chunks"], 3);
        assert_eq!(body["countries"], 2);
        assert_eq!(body["country_list"], json!(["France", "United Kingdom"]));
        assert_eq!(body["year_range"], json!([2015, 2022]));
    }
}
