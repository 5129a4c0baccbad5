//! Index module - building, persisting, and loading vector indexes
//!
//! A persisted index is a directory holding:
//! - `index_meta.json`: model, dimensions, counts, graph parameters
//! - `docstore.jsonl` + `docstore.idx.json`: node text and metadata
//! - `vectors.ids`: graph key -> node id, one per line
//! - `vectors.usearch`: HNSW graph

mod builder;
mod docstore;
mod meta;
mod searcher;
mod vectors;

pub use builder::{IndexBuilder, DEFAULT_CONNECTIVITY, DEFAULT_EXPANSION};
pub use docstore::{DocStore, DocStoreWriter};
pub use meta::{IndexMeta, FORMAT_VERSION};
pub use searcher::{ScoredNode, VectorIndex};
pub use vectors::HnswGraph;

pub const META_FILE: &str = "index_meta.json";
pub const DOCSTORE_FILE: &str = "docstore.jsonl";
pub const DOCSTORE_INDEX_FILE: &str = "docstore.idx.json";
pub const IDS_FILE: &str = "vectors.ids";
pub const VECTORS_FILE: &str = "vectors.usearch";
