//! Error categories surfaced by the indexing and query pipelines
//!
//! Pipeline functions return `anyhow::Result`; the variants below are the
//! failures callers may want to tell apart, recoverable with
//! `err.downcast_ref::<Error>()`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The provider credential is missing from the environment
    #[error("{0} is not set. Export it or add it to a .env file in the working directory.")]
    MissingCredential(&'static str),

    /// An input root does not exist or is not a directory
    #[error("Input directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Nothing indexable was found under the input roots
    #[error("No documents found to index under {}", format_roots(.0))]
    NoDocuments(Vec<PathBuf>),

    /// No persisted index at the expected location
    #[error("No index found at {}. Run 'docrag-index' to create one.", .0.display())]
    IndexNotFound(PathBuf),

    /// A persisted index exists but cannot be reconstructed
    #[error("Index at {} is corrupt: {reason}", .path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl Error {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::CorruptIndex {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

fn format_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
