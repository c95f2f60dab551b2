//! Query pipeline.
//!
//! Runs one question through intent parsing, filter compilation, filtered
//! retrieval, context assembly and answer synthesis. Every step is awaited
//! in order; the pipeline holds no per-query state.

use crate::answer::AnswerSynthesizer;
use crate::context::{assemble_context, collect_sources};
use crate::embeddings::EmbeddingProvider;
use crate::filter::FilterCompiler;
use crate::intent::IntentParser;
use crate::retriever::VectorRetriever;
use crate::stats::StatsAggregator;
use crate::store::{MetadataStore, VectorStore};
use crate::types::{CorpusStats, QueryResponse, RetrievalFilter, RetrievalResult};
use nss_core::{AppConfig, AppError, AppResult};
use nss_llm::LlmClient;
use nss_prompt::{load_prompt, ANSWER_PROMPT_ID, INTENT_PROMPT_ID};
use std::path::PathBuf;
use std::sync::Arc;

/// Answer returned when retrieval finds nothing.
pub const NO_RESULTS_ANSWER: &str = "No relevant documents found for your query. Try broadening your search or checking the country/year filters.";

/// Settings the pipeline takes from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Completion model for both model calls
    pub model: String,

    /// Default number of chunks retrieved per query
    pub top_k: usize,

    /// Drop unrecognized countries instead of passing them through
    pub strict_countries: bool,

    /// Workspace searched for prompt overrides
    pub workspace: PathBuf,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            top_k: config.retrieval.top_k,
            strict_countries: config.retrieval.strict_countries,
            workspace: config.workspace.clone(),
        }
    }
}

/// The RAG query pipeline with its injected collaborators.
pub struct QueryPipeline {
    intent: IntentParser,
    filters: FilterCompiler,
    retriever: VectorRetriever,
    answers: AnswerSynthesizer,
    stats: StatsAggregator,
}

impl QueryPipeline {
    /// Wire the pipeline. Prompts are loaded once here.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStore>,
        metadata: Arc<dyn MetadataStore>,
        settings: &PipelineSettings,
    ) -> AppResult<Self> {
        let intent_prompt = load_prompt(&settings.workspace, INTENT_PROMPT_ID)?;
        let answer_prompt = load_prompt(&settings.workspace, ANSWER_PROMPT_ID)?;

        Ok(Self {
            intent: IntentParser::new(Arc::clone(&llm), settings.model.clone(), intent_prompt)
                .with_strict_countries(settings.strict_countries),
            filters: FilterCompiler::new(Arc::clone(&metadata)),
            retriever: VectorRetriever::new(embedder, vectors, settings.top_k),
            answers: AnswerSynthesizer::new(llm, settings.model.clone(), answer_prompt),
            stats: StatsAggregator::new(metadata),
        })
    }

    /// Answer a question end to end.
    #[tracing::instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn resolve_query(&self, question: &str) -> AppResult<QueryResponse> {
        if question.trim().is_empty() {
            return Err(AppError::InvalidQuery("Query cannot be empty".to_string()));
        }

        let parsed = self.intent.parse(question).await?;
        tracing::info!(
            country = ?parsed.country,
            year = ?parsed.year,
            year_min = ?parsed.year_min,
            year_max = ?parsed.year_max,
            wants_latest = parsed.wants_latest,
            "Parsed query intent"
        );

        let filters = self.filters.compile(&parsed).await?;
        tracing::info!(?filters, "Compiled retrieval filter");

        let result = self.retriever.retrieve(&parsed.search_query, &filters).await?;

        if result.is_empty() {
            return Ok(QueryResponse {
                answer: NO_RESULTS_ANSWER.to_string(),
                sources: Vec::new(),
                parsed_query: parsed,
                filters,
            });
        }

        let context = assemble_context(&result);
        let answer = self.answers.synthesize(question, &context).await?;

        Ok(QueryResponse {
            answer,
            sources: collect_sources(&result),
            parsed_query: parsed,
            filters,
        })
    }

    /// Filtered retrieval without intent parsing or synthesis.
    pub async fn retrieve(
        &self,
        query: &str,
        filter: &RetrievalFilter,
        top_k: Option<usize>,
    ) -> AppResult<RetrievalResult> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidQuery("Query cannot be empty".to_string()));
        }
        let top_k = top_k.unwrap_or_else(|| self.retriever.top_k());
        self.retriever.retrieve_top_k(query, filter, top_k).await
    }

    /// Corpus summary.
    pub async fn get_stats(&self) -> AppResult<CorpusStats> {
        self.stats.collect().await
    }
}
