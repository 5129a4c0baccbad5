//! Configuration for docrag
//!
//! Config file lookup order: `--config`/`$DOCRAG_CONFIG`, `./docrag.toml`,
//! then `~/.config/docrag/config.toml`.
//!
//! Example config:
//! ```toml
//! [embedding]
//! model = "text-embedding-3-small"
//! batch_size = 100
//!
//! [llm]
//! model = "gpt-4o-mini"
//! max_tokens = 512
//!
//! [index]
//! roots = ["./data"]
//! persist_dir = "./storage"
//! chunk_size = 512
//! chunk_overlap = 64
//! top_k = 2
//! ```
//!
//! The API credential never lives in the config file; it is read from
//! `OPENAI_API_KEY` (optionally populated from a `.env` file).

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Environment variable holding the provider credential
pub const CREDENTIAL_VAR: &str = "OPENAI_API_KEY";

/// Environment variable for an OpenAI-compatible base URL
pub const API_BASE_VAR: &str = "OPENAI_BASE_URL";

/// Provider API key. `Debug` never prints the secret.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Read the credential from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_value(std::env::var(CREDENTIAL_VAR).ok())
    }

    /// Validate a raw credential value; blank counts as missing
    pub fn from_value(value: Option<String>) -> anyhow::Result<Self> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(Self(v.trim().to_string())),
            _ => Err(Error::MissingCredential(CREDENTIAL_VAR).into()),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Config file contents
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub index: IndexConfig,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_batch_size() -> usize {
    100
}

/// Completion model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.1
}

/// Index build and retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directories to index, walked in order
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// Where the persisted index lives
    #[serde(default = "default_persist_dir")]
    pub persist_dir: PathBuf,

    /// Chunk size in tokens
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunk overlap in tokens
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Files larger than this are skipped
    #[serde(default = "default_max_file_size_kb")]
    pub max_file_size_kb: u64,

    /// Extensions to include (e.g. ".md"); all files when unset
    pub file_types: Option<Vec<String>>,

    #[serde(default)]
    pub include_hidden: bool,

    /// Skip files matched by `.gitignore` and related ignore files
    #[serde(default)]
    pub respect_gitignore: bool,

    /// HNSW graph degree
    #[serde(default = "default_connectivity")]
    pub connectivity: usize,

    /// HNSW build-time candidate list size
    #[serde(default = "default_expansion")]
    pub expansion: usize,

    /// Nodes retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            persist_dir: default_persist_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_file_size_kb: default_max_file_size_kb(),
            file_types: None,
            include_hidden: false,
            respect_gitignore: false,
            connectivity: default_connectivity(),
            expansion: default_expansion(),
            top_k: default_top_k(),
        }
    }
}

fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("./data")]
}

fn default_persist_dir() -> PathBuf {
    PathBuf::from("./storage")
}

fn default_chunk_size() -> usize {
    512
}

fn default_chunk_overlap() -> usize {
    64
}

fn default_max_file_size_kb() -> u64 {
    1024
}

fn default_connectivity() -> usize {
    crate::index::DEFAULT_CONNECTIVITY
}

fn default_expansion() -> usize {
    crate::index::DEFAULT_EXPANSION
}

fn default_top_k() -> usize {
    2
}

impl Config {
    /// Per-user config file path
    pub fn user_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docrag")
            .join("config.toml")
    }

    /// Load config from an explicitly requested file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load config from `explicit` if given, otherwise from the first file
    /// found in the default locations, returning defaults if none exist
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        for path in [PathBuf::from("docrag.toml"), Self::user_config_path()] {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!("{:#}", e),
            }
        }

        Ok(Self::default())
    }
}

/// Everything a pipeline needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub credential: Credential,

    /// OpenAI-compatible base URL override
    pub api_base: Option<String>,

    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub index: IndexConfig,
}

impl Settings {
    pub fn new(credential: Credential, config: Config) -> Self {
        Self {
            credential,
            api_base: None,
            embedding: config.embedding,
            llm: config.llm,
            index: config.index,
        }
    }

    pub fn with_api_base(mut self, api_base: Option<String>) -> Self {
        self.api_base = api_base.filter(|s| !s.trim().is_empty());
        self
    }
}
