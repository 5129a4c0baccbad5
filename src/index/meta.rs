//! Index metadata handling

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Current on-disk format version
pub const FORMAT_VERSION: &str = "1";

/// Index metadata stored alongside the index files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Metadata format version
    pub version: String,

    /// Embedding model used for every node; queries must use the same one
    pub embedding_model: String,

    /// Embedding dimensions
    pub dimensions: usize,

    /// Number of embedded nodes
    pub node_count: usize,

    /// Number of source documents
    pub document_count: usize,

    /// Input roots the index was built from
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// HNSW graph degree
    pub connectivity: usize,

    /// HNSW expansion used for build and search
    pub expansion: usize,

    pub created_at: DateTime<Utc>,
}

impl IndexMeta {
    /// Load metadata from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let meta: IndexMeta =
            serde_json::from_str(&content).map_err(|e| Error::corrupt(path, e))?;

        if meta.version != FORMAT_VERSION {
            return Err(Error::corrupt(
                path,
                format!("unsupported format version {}", meta.version),
            )
            .into());
        }

        Ok(meta)
    }

    /// Save metadata to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IndexMeta {
        IndexMeta {
            version: FORMAT_VERSION.to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            node_count: 3,
            document_count: 1,
            roots: vec![PathBuf::from("data")],
            connectivity: 16,
            expansion: 64,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index_meta.json");
        sample().save(&path).unwrap();

        let loaded = IndexMeta::load(&path).unwrap();
        assert_eq!(loaded.embedding_model, "text-embedding-3-small");
        assert_eq!(loaded.node_count, 3);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index_meta.json");
        let mut meta = sample();
        meta.version = "99".to_string();
        meta.save(&path).unwrap();

        let err = IndexMeta::load(&path).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::CorruptIndex { .. })));
    }

    #[test]
    fn test_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index_meta.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = IndexMeta::load(&path).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::CorruptIndex { .. })));
    }
}
