//! Index builder - assembles nodes and embeddings, then persists them

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use crate::chunker::Node;
use crate::embedding::normalize;
use crate::error::Error;

use super::docstore::DocStore;
use super::meta::{IndexMeta, FORMAT_VERSION};
use super::vectors::HnswGraph;
use super::{IDS_FILE, META_FILE, VECTORS_FILE};

pub const DEFAULT_CONNECTIVITY: usize = 16;
pub const DEFAULT_EXPANSION: usize = 64;

/// Builder for a persisted vector index.
///
/// The builder has no search API: an index only becomes queryable through
/// [`super::VectorIndex::load`] after [`IndexBuilder::persist`] succeeds.
pub struct IndexBuilder {
    embedding_model: String,
    dimensions: Option<usize>,
    connectivity: usize,
    expansion: usize,
    roots: Vec<PathBuf>,
    document_count: usize,
    nodes: Vec<Node>,
    embeddings: Vec<Vec<f32>>,
}

impl IndexBuilder {
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            embedding_model: embedding_model.into(),
            dimensions: None,
            connectivity: DEFAULT_CONNECTIVITY,
            expansion: DEFAULT_EXPANSION,
            roots: Vec::new(),
            document_count: 0,
            nodes: Vec::new(),
            embeddings: Vec::new(),
        }
    }

    /// Record where the documents came from
    pub fn with_source(mut self, roots: &[PathBuf], document_count: usize) -> Self {
        self.roots = roots.to_vec();
        self.document_count = document_count;
        self
    }

    /// HNSW graph degree and expansion
    pub fn with_graph_params(mut self, connectivity: usize, expansion: usize) -> Self {
        self.connectivity = connectivity.max(2);
        self.expansion = expansion.max(1);
        self
    }

    /// Add a node with its embedding. The first embedding fixes the dimensions.
    pub fn add_node(&mut self, node: Node, mut embedding: Vec<f32>) -> anyhow::Result<()> {
        match self.dimensions {
            None if embedding.is_empty() => anyhow::bail!("Empty embedding for node {}", node.id),
            None => self.dimensions = Some(embedding.len()),
            Some(expected) if expected != embedding.len() => {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                }
                .into());
            }
            Some(_) => {}
        }

        normalize(&mut embedding);
        self.nodes.push(node);
        self.embeddings.push(embedding);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Write the index to `persist_dir`, replacing whatever was there.
    ///
    /// Files are written to a sibling staging directory that is swapped in
    /// only once complete; on failure the previous index is left untouched.
    pub fn persist(self, persist_dir: &Path) -> anyhow::Result<IndexMeta> {
        let Some(dimensions) = self.dimensions.filter(|_| !self.nodes.is_empty()) else {
            return Err(Error::NoDocuments(self.roots).into());
        };

        let name = persist_dir
            .file_name()
            .with_context(|| {
                format!("Persist path {} must name a directory", persist_dir.display())
            })?
            .to_string_lossy()
            .to_string();
        let parent = match persist_dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        let staging = parent.join(format!("{}.staging-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir(&staging)
            .with_context(|| format!("Failed to create {}", staging.display()))?;

        let meta = IndexMeta {
            version: FORMAT_VERSION.to_string(),
            embedding_model: self.embedding_model.clone(),
            dimensions,
            node_count: self.nodes.len(),
            document_count: self.document_count,
            roots: self.roots.clone(),
            connectivity: self.connectivity,
            expansion: self.expansion,
            created_at: Utc::now(),
        };

        if let Err(e) = self.write_files(&staging, &meta) {
            remove_quietly(&staging);
            return Err(e);
        }

        if let Err(e) = swap_into_place(&staging, persist_dir, &parent, &name) {
            remove_quietly(&staging);
            return Err(e);
        }

        info!(
            "Index persisted at {:?} ({} nodes, {} dims)",
            persist_dir, meta.node_count, meta.dimensions
        );
        Ok(meta)
    }

    fn write_files(&self, dir: &Path, meta: &IndexMeta) -> anyhow::Result<()> {
        let mut docstore = DocStore::create(dir)?;
        for node in &self.nodes {
            docstore.add(node)?;
        }
        docstore.finish()?;

        // Graph keys are positions in this list
        let ids: Vec<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        std::fs::write(dir.join(IDS_FILE), ids.join("\n"))?;

        let graph = HnswGraph::build(
            &self.embeddings,
            meta.dimensions,
            self.connectivity,
            self.expansion,
        )?;
        graph.save(&dir.join(VECTORS_FILE))?;

        // Metadata last: its presence marks a complete index
        meta.save(&dir.join(META_FILE))?;
        Ok(())
    }
}

/// Replace `target` with `staging`, restoring the old contents if the final rename fails
fn swap_into_place(staging: &Path, target: &Path, parent: &Path, name: &str) -> anyhow::Result<()> {
    let backup = if target.exists() {
        let backup = parent.join(format!("{}.old-{}", name, uuid::Uuid::new_v4()));
        std::fs::rename(target, &backup).with_context(|| {
            format!("Failed to move aside existing index at {}", target.display())
        })?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = std::fs::rename(staging, target) {
        if let Some(backup) = &backup {
            if let Err(restore) = std::fs::rename(backup, target) {
                warn!("Failed to restore previous index from {:?}: {}", backup, restore);
            }
        }
        return Err(e)
            .with_context(|| format!("Failed to move new index into {}", target.display()));
    }

    if let Some(backup) = backup {
        remove_quietly(&backup);
    }
    Ok(())
}

fn remove_quietly(path: &Path) {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    if let Err(e) = result {
        warn!("Failed to remove {:?}: {}", path, e);
    }
}
