//! docrag - index directories of source files and answer questions about them
//!
//! Two binaries share one persisted index:
//! - `docrag-index` reads documents, embeds them, and persists the index
//! - `docrag-query` loads the index and answers a question with an LLM

pub mod chunker;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod indexer;
pub mod llm;
pub mod reader;

pub use config::{Config, Credential, Settings};
pub use engine::{QueryEngine, Response};
pub use error::Error;
pub use index::{IndexBuilder, IndexMeta, VectorIndex};
pub use indexer::Indexer;
