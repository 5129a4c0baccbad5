//! Loaded vector index - read-only retrieval over a persisted index

use std::path::Path;

use tracing::{info, warn};

use crate::chunker::Node;
use crate::error::Error;

use super::docstore::DocStore;
use super::meta::IndexMeta;
use super::vectors::HnswGraph;
use super::{IDS_FILE, META_FILE, VECTORS_FILE};

/// A retrieved node and its similarity to the query
#[derive(Debug, Clone)]
pub struct ScoredNode {
    pub node: Node,
    pub score: f32,
}

impl ScoredNode {
    pub fn source(&self) -> &str {
        self.node
            .metadata
            .get("file_path")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>")
    }
}

/// A persisted index loaded for querying
pub struct VectorIndex {
    meta: IndexMeta,
    docstore: DocStore,
    id_map: Vec<String>,
    graph: HnswGraph,
}

impl VectorIndex {
    /// Load the index persisted in `dir`
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let meta_path = dir.join(META_FILE);
        if !dir.is_dir() || !meta_path.is_file() {
            return Err(Error::IndexNotFound(dir.to_path_buf()).into());
        }

        info!("Loading index from {:?}", dir);
        let meta = IndexMeta::load(&meta_path)?;

        let docstore = DocStore::open(dir)?;

        let id_map: Vec<String> = std::fs::read_to_string(dir.join(IDS_FILE))
            .map_err(|e| Error::corrupt(dir, format!("{}: {}", IDS_FILE, e)))?
            .lines()
            .map(str::to_string)
            .collect();

        let graph = HnswGraph::load(
            &dir.join(VECTORS_FILE),
            meta.dimensions,
            meta.connectivity,
            meta.expansion,
        )?;

        let counts = [docstore.len(), id_map.len(), graph.len()];
        if counts.iter().any(|&c| c != meta.node_count) {
            return Err(Error::corrupt(
                dir,
                format!(
                    "expected {} nodes, found {} in docstore, {} ids, {} vectors",
                    meta.node_count, counts[0], counts[1], counts[2]
                ),
            )
            .into());
        }
        if let Some(missing) = id_map.iter().find(|id| !docstore.contains(id)) {
            let reason = format!("node {} missing from docstore", missing);
            return Err(Error::corrupt(dir, reason).into());
        }

        info!(
            "Loaded index: {} nodes from {} documents ({})",
            meta.node_count, meta.document_count, meta.embedding_model
        );

        Ok(Self {
            meta,
            docstore,
            id_map,
            graph,
        })
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    /// Retrieve the `top_k` nodes nearest to a query embedding, best first
    pub fn retrieve(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> anyhow::Result<Vec<ScoredNode>> {
        if query_embedding.len() != self.meta.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.meta.dimensions,
                actual: query_embedding.len(),
            }
            .into());
        }

        let mut results = Vec::with_capacity(top_k);

        for (key, score) in self.graph.search(query_embedding, top_k)? {
            let Some(id) = self.id_map.get(key as usize) else {
                warn!("Vector key {} has no node id", key);
                continue;
            };
            let node = self.docstore.get(id)?;
            results.push(ScoredNode { node, score });
        }

        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.id_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_map.is_empty()
    }
}
