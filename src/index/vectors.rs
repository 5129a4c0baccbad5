//! HNSW vector graph using the usearch crate

use std::path::Path;

use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::error::Error;

/// Nearest-neighbor graph over node embeddings.
/// Keys are positions in the id map written next to the graph.
pub struct HnswGraph {
    index: Index,
}

fn options(dimensions: usize, connectivity: usize, expansion: usize) -> IndexOptions {
    IndexOptions {
        dimensions,
        metric: MetricKind::IP, // Inner product over normalized vectors
        quantization: ScalarKind::F32,
        connectivity,
        expansion_add: expansion,
        expansion_search: expansion,
        multi: false,
    }
}

impl HnswGraph {
    /// Build a graph from embeddings in key order
    pub fn build(
        embeddings: &[Vec<f32>],
        dimensions: usize,
        connectivity: usize,
        expansion: usize,
    ) -> anyhow::Result<Self> {
        info!(
            "Building HNSW graph: {} vectors, {} dims, degree={}, expansion={}",
            embeddings.len(),
            dimensions,
            connectivity,
            expansion
        );

        let index = Index::new(&options(dimensions, connectivity, expansion))?;
        index.reserve(embeddings.len())?;

        for (i, embedding) in embeddings.iter().enumerate() {
            index.add(i as u64, embedding.as_slice())?;
        }

        Ok(Self { index })
    }

    /// Save the graph to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        self.index.save(path.to_string_lossy().as_ref())?;
        debug!("HNSW graph saved to {:?}", path);
        Ok(())
    }

    /// Load a graph saved with the same parameters
    pub fn load(
        path: &Path,
        dimensions: usize,
        connectivity: usize,
        expansion: usize,
    ) -> anyhow::Result<Self> {
        if !path.is_file() {
            return Err(Error::corrupt(path, "vector graph file is missing").into());
        }

        let index = Index::new(&options(dimensions, connectivity, expansion))?;
        index
            .load(path.to_string_lossy().as_ref())
            .map_err(|e| Error::corrupt(path, e))?;

        if index.dimensions() != dimensions {
            return Err(Error::corrupt(
                path,
                format!(
                    "graph has {} dimensions, metadata says {}",
                    index.dimensions(),
                    dimensions
                ),
            )
            .into());
        }

        debug!("Loaded HNSW graph with {} vectors", index.size());
        Ok(Self { index })
    }

    /// Nearest neighbors as (key, similarity), best first
    pub fn search(&self, query: &[f32], top_k: usize) -> anyhow::Result<Vec<(u64, f32)>> {
        if top_k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let matches = self.index.search(query, top_k)?;

        // usearch reports IP distance as 1 - dot
        Ok(matches
            .keys
            .iter()
            .zip(matches.distances.iter())
            .map(|(key, dist)| (*key, 1.0 - *dist))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
