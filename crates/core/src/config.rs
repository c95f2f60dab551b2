//! Configuration management for NSS Search.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`.nss/config.yaml` in the workspace, or `NSS_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 10;

/// Default hosted provider endpoint (OpenAI-compatible).
pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .nss/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active completion provider (e.g., "openrouter", "openai", "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Explicit API key override
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider configurations
    pub llm: LlmConfig,

    /// Vector index location
    pub index: IndexConfig,

    /// Embedding settings
    pub embedding: EmbeddingSettings,

    /// Retrieval settings
    pub retrieval: RetrievalSettings,

    /// HTTP server settings
    pub server: ServerConfig,
}

/// Provider section of config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(rename = "activeEmbeddingProvider")]
    pub active_embedding_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert(
            "openrouter".to_string(),
            ProviderConfig::Hosted {
                api_key_env: "OPENROUTER_API_KEY".to_string(),
                model: "anthropic/claude-3.5-sonnet".to_string(),
                embedding_model: Some("openai/text-embedding-3-small".to_string()),
                endpoint: Some(OPENROUTER_ENDPOINT.to_string()),
            },
        );
        providers.insert(
            "ollama".to_string(),
            ProviderConfig::Ollama {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3.2".to_string(),
                embedding_model: Some("nomic-embed-text".to_string()),
                timeout: Some(60),
            },
        );

        Self {
            active_provider: "openrouter".to_string(),
            active_embedding_provider: "openrouter".to_string(),
            providers,
        }
    }
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    /// OpenAI-compatible hosted API (OpenRouter, OpenAI)
    Hosted {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
    },
    /// Local Ollama runtime
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Completion model for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Hosted { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Embedding model for this provider, if configured.
    pub fn embedding_model(&self) -> Option<&str> {
        match self {
            Self::Hosted {
                embedding_model, ..
            }
            | Self::Ollama {
                embedding_model, ..
            } => embedding_model.as_deref(),
        }
    }

    /// Endpoint override, if configured.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Hosted { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Location of the pre-built vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// LanceDB directory
    pub path: PathBuf,

    /// Table holding the document chunks
    pub table: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./nss_index"),
            table: "nss_documents".to_string(),
        }
    }
}

/// Embedding settings shared by the index and the query path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Vector dimension of the index
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { dimensions: 1536 }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Chunks retrieved per question
    #[serde(rename = "topK")]
    pub top_k: usize,

    /// Drop country names outside the supported list instead of passing them through
    #[serde(rename = "strictCountries")]
    pub strict_countries: bool,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            strict_countries: false,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Full configuration file structure. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    index: Option<IndexSection>,
    embedding: Option<EmbeddingSection>,
    retrieval: Option<RetrievalSection>,
    server: Option<ServerSection>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IndexSection {
    path: Option<PathBuf>,
    table: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EmbeddingSection {
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    #[serde(rename = "strictCountries")]
    strict_countries: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ServerSection {
    bind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let llm = LlmConfig::default();
        let model = llm
            .providers
            .get(&llm.active_provider)
            .map(|p| p.model().to_string())
            .unwrap_or_default();

        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: llm.active_provider.clone(),
            model,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm,
            index: IndexConfig::default(),
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalSettings::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config file and environment.
    ///
    /// Environment variables:
    /// - `NSS_WORKSPACE`: Override workspace path
    /// - `NSS_CONFIG`: Path to config file
    /// - `NSS_PROVIDER`: Completion provider
    /// - `NSS_MODEL`: Completion model
    /// - `NSS_API_KEY`: API key override
    /// - `NSS_INDEX_PATH`: LanceDB directory
    /// - `NSS_BIND`: Server bind address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and config file.
    ///
    /// `workspace` wins over `NSS_WORKSPACE` and `config_file` over
    /// `NSS_CONFIG`. Without a config file, `<workspace>/.nss/config.yaml`
    /// is read when present.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var("NSS_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("NSS_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.nss_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("NSS_PROVIDER") {
            config.select_provider(provider);
        }

        if let Ok(model) = std::env::var("NSS_MODEL") {
            config.model = model;
        }

        if let Ok(index_path) = std::env::var("NSS_INDEX_PATH") {
            config.index.path = PathBuf::from(index_path);
        }

        if let Ok(bind) = std::env::var("NSS_BIND") {
            config.server.bind = bind;
        }

        config.api_key = std::env::var("NSS_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;
        let mut result = self.clone();

        if let Some(index) = config_file.index {
            if let Some(path) = index.path {
                result.index.path = path;
            }
            if let Some(table) = index.table {
                result.index.table = table;
            }
        }

        if let Some(dimensions) = config_file.embedding.and_then(|e| e.dimensions) {
            result.embedding.dimensions = dimensions;
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(top_k) = retrieval.top_k {
                result.retrieval.top_k = top_k;
            }
            if let Some(strict) = retrieval.strict_countries {
                result.retrieval.strict_countries = strict;
            }
        }

        if let Some(bind) = config_file.server.and_then(|s| s.bind) {
            result.server.bind = bind;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }
            result.llm = llm;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    /// A new workspace or config file reloads the configuration from it before
    /// the remaining flags are applied.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> AppResult<Self> {
        let mut config = if workspace.is_some() || config_file.is_some() {
            Self::load_from(
                Some(workspace.unwrap_or(self.workspace)),
                config_file.or(self.config_file),
            )?
        } else {
            self
        };

        if let Some(provider) = provider {
            config.select_provider(provider);
        }

        if let Some(model) = model {
            config.model = model;
        }

        if let Some(log_level) = log_level {
            config.log_level = Some(log_level);
        }

        if verbose {
            config.verbose = true;
            if config.log_level.is_none() {
                config.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Switch the completion provider. The model follows the provider's
    /// configured default unless set explicitly afterwards.
    fn select_provider(&mut self, provider: String) {
        if provider != self.provider {
            if let Some(provider_config) = self.get_provider_config(&provider) {
                self.model = provider_config.model().to_string();
            }
        }
        self.provider = provider;
    }

    /// Path to the .nss directory.
    pub fn nss_dir(&self) -> PathBuf {
        self.workspace.join(".nss")
    }

    /// Index path resolved against the workspace when relative.
    pub fn index_path(&self) -> PathBuf {
        if self.index.path.is_absolute() {
            self.index.path.clone()
        } else {
            self.workspace.join(&self.index.path)
        }
    }

    /// Get a provider's configuration.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.providers.get(provider)
    }

    /// Embedding provider name.
    pub fn embedding_provider(&self) -> &str {
        &self.llm.active_embedding_provider
    }

    /// Embedding model of the active embedding provider.
    pub fn embedding_model(&self) -> AppResult<String> {
        self.get_provider_config(self.embedding_provider())
            .and_then(|p| p.embedding_model())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "No embedding model configured for provider '{}'",
                    self.embedding_provider()
                ))
            })
    }

    /// Resolve the API key for a provider.
    ///
    /// `NSS_API_KEY` wins; otherwise the provider's `apiKeyEnv` variable is read.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider)? {
            ProviderConfig::Hosted { api_key_env, .. } => std::env::var(api_key_env).ok(),
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openrouter", "openai", "ollama"];

        for (provider, embeddings) in [
            (self.provider.as_str(), false),
            (self.embedding_provider(), true),
        ] {
            if embeddings && provider == "mock" {
                continue;
            }

            if !known_providers.contains(&provider) {
                return Err(AppError::Config(format!(
                    "Unknown provider: {}. Supported: {}",
                    provider,
                    known_providers.join(", ")
                )));
            }

            if let Some(ProviderConfig::Hosted { api_key_env, .. }) =
                self.get_provider_config(provider)
            {
                if self.api_key.is_none() && std::env::var(api_key_env).is_err() {
                    return Err(AppError::Config(format!(
                        "Set {} environment variable",
                        api_key_env
                    )));
                }
            }
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("retrieval.topK must be positive".to_string()));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
