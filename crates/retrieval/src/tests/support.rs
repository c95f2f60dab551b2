//! Test doubles shared by the pipeline tests.

use crate::embeddings::providers::MockProvider;
use crate::embeddings::EmbeddingProvider;
use crate::pipeline::{PipelineSettings, QueryPipeline};
use crate::predicate::{Condition, Predicate};
use crate::store::{InMemoryStore, MetadataStore, VectorStore};
use crate::types::{Chunk, ChunkMetadata};
use nss_core::{AppError, AppResult};
use nss_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const DIMS: usize = 128;

/// Replies with queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(AppError::Llm(message.to_string()))])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> LlmRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Llm("no scripted reply left".to_string())))?;

        Ok(LlmResponse {
            content: reply,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// (id, country, year, doc_name, page, text)
const CORPUS: &[(&str, Option<&str>, Option<i32>, &str, i32, &str)] = &[
    ("us17-4", Some("United States"), Some(2017), "us_nss_2017.pdf", 4, "America first: protect the homeland, promote prosperity, preserve peace through strength."),
    ("us17-9", Some("United States"), Some(2017), "us_nss_2017.pdf", 9, "Cyber threats from state actors target critical infrastructure."),
    ("us22-2", Some("United States"), Some(2022), "us_nss_2022.pdf", 2, "Main themes: out-competing China, constraining Russia, priorities of integrated deterrence."),
    ("us22-7", Some("United States"), Some(2022), "us_nss_2022.pdf", 7, "Strategy overview and objectives for the decisive decade."),
    ("jp10-3", Some("Japan"), Some(2010), "jp_ndpg_2010.pdf", 3, "Dynamic defense force and defense strategy evolution."),
    ("jp13-5", Some("Japan"), Some(2013), "jp_nss_2013.pdf", 5, "Proactive contribution to peace; defense strategy changes."),
    ("jp22-6", Some("Japan"), Some(2022), "jp_nss_2022.pdf", 6, "Counterstrike capabilities and defense strategy changes."),
    ("cn19-1", Some("China"), Some(2019), "cn_defense_2019.pdf", 1, "China opposes cyber threats and hegemonism."),
    ("ru21-2", Some("Russia"), Some(2021), "ru_nss_2021.pdf", 2, "Information security and cyber threats to sovereignty."),
    ("xx-1", None, None, "undated.pdf", 1, "Undated excerpt about cooperation."),
];

pub async fn corpus_store(embedder: &MockProvider) -> InMemoryStore {
    let mut store = InMemoryStore::new();
    for (id, country, year, doc_name, page, text) in CORPUS {
        let embedding = embedder.embed(text).await.unwrap();
        store.insert(
            Chunk {
                id: id.to_string(),
                text: text.to_string(),
                metadata: ChunkMetadata {
                    country: country.map(str::to_string),
                    year: *year,
                    doc_name: doc_name.to_string(),
                    page: *page,
                },
            },
            embedding,
        );
    }
    store
}

pub fn settings(workspace: &Path) -> PipelineSettings {
    PipelineSettings {
        model: "test-model".to_string(),
        top_k: 10,
        strict_countries: false,
        workspace: workspace.to_path_buf(),
    }
}

/// Pipeline over the test corpus with `llm` as the model.
pub async fn pipeline_with(
    llm: Arc<ScriptedLlm>,
    settings: &PipelineSettings,
) -> QueryPipeline {
    let embedder = Arc::new(MockProvider::new(DIMS));
    let store = Arc::new(corpus_store(&embedder).await);
    QueryPipeline::new(llm, embedder, store.clone(), store, settings).unwrap()
}

pub fn corpus_len() -> usize {
    CORPUS.len()
}

/// Embedder that errors, or returns vectors of the wrong length.
#[derive(Debug)]
pub enum BrokenEmbedder {
    Unavailable,
    WrongDimensions(usize),
}

#[async_trait::async_trait]
impl EmbeddingProvider for BrokenEmbedder {
    fn provider_name(&self) -> &str {
        "broken"
    }

    fn model_name(&self) -> &str {
        "broken-v1"
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        match self {
            Self::Unavailable => Err(AppError::Embedding("service unavailable".to_string())),
            Self::WrongDimensions(dims) => Ok(texts.iter().map(|_| vec![0.5; *dims]).collect()),
        }
    }
}

/// Store whose every read fails.
pub struct UnreachableStore;

#[async_trait::async_trait]
impl MetadataStore for UnreachableStore {
    async fn count(&self) -> AppResult<usize> {
        Err(AppError::Store("connection reset".to_string()))
    }

    async fn fetch_page(&self, _limit: usize, _offset: usize) -> AppResult<Vec<ChunkMetadata>> {
        Err(AppError::Store("connection reset".to_string()))
    }

    async fn fetch_where(&self, _condition: &Condition) -> AppResult<Vec<ChunkMetadata>> {
        Err(AppError::Store("connection reset".to_string()))
    }
}

#[async_trait::async_trait]
impl VectorStore for UnreachableStore {
    async fn nearest(
        &self,
        _embedding: &[f32],
        _top_k: usize,
        _predicate: &Predicate,
    ) -> AppResult<Vec<(Chunk, f32)>> {
        Err(AppError::Store("connection reset".to_string()))
    }
}

/// Pipeline with every collaborator supplied by the caller.
pub fn pipeline_from(
    llm: Arc<ScriptedLlm>,
    embedder: Arc<dyn EmbeddingProvider>,
    vectors: Arc<dyn VectorStore>,
    metadata: Arc<dyn MetadataStore>,
    settings: &PipelineSettings,
) -> QueryPipeline {
    QueryPipeline::new(llm, embedder, vectors, metadata, settings).unwrap()
}

/// The test corpus embedded with the mock provider.
pub async fn corpus() -> Arc<InMemoryStore> {
    Arc::new(corpus_store(&MockProvider::new(DIMS)).await)
}
