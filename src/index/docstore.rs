//! Node storage - JSONL file with a byte-offset index

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::chunker::Node;
use crate::error::Error;

use super::{DOCSTORE_FILE, DOCSTORE_INDEX_FILE};

/// Read side of the docstore
pub struct DocStore {
    /// node id -> byte offset in the JSONL file
    offsets: HashMap<String, u64>,
    jsonl_path: PathBuf,
}

impl DocStore {
    /// Create a new docstore in `dir` for writing
    pub fn create(dir: &Path) -> anyhow::Result<DocStoreWriter> {
        let jsonl_path = dir.join(DOCSTORE_FILE);
        let file = File::create(&jsonl_path)?;

        Ok(DocStoreWriter {
            writer: BufWriter::new(file),
            offsets: HashMap::new(),
            idx_path: dir.join(DOCSTORE_INDEX_FILE),
            current_offset: 0,
        })
    }

    /// Open the docstore in `dir` for reading
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        let jsonl_path = dir.join(DOCSTORE_FILE);
        let idx_path = dir.join(DOCSTORE_INDEX_FILE);

        if !jsonl_path.is_file() {
            return Err(Error::corrupt(dir, format!("missing {}", DOCSTORE_FILE)).into());
        }
        let idx_content = std::fs::read_to_string(&idx_path)
            .map_err(|e| Error::corrupt(dir, format!("{}: {}", DOCSTORE_INDEX_FILE, e)))?;
        let offsets: HashMap<String, u64> = serde_json::from_str(&idx_content)
            .map_err(|e| Error::corrupt(dir, format!("{}: {}", DOCSTORE_INDEX_FILE, e)))?;

        Ok(Self {
            offsets,
            jsonl_path,
        })
    }

    /// Get a node by ID
    pub fn get(&self, id: &str) -> anyhow::Result<Node> {
        let offset = self
            .offsets
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Node not found: {}", id))?;

        let mut file = File::open(&self.jsonl_path)?;
        file.seek(SeekFrom::Start(*offset))?;

        let mut reader = BufReader::new(file);
        let mut line = String::new();
        reader.read_line(&mut line)?;

        let node: Node = serde_json::from_str(&line)
            .map_err(|e| Error::corrupt(&self.jsonl_path, format!("node {}: {}", id, e)))?;
        Ok(node)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.offsets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Writer for creating a docstore
pub struct DocStoreWriter {
    writer: BufWriter<File>,
    offsets: HashMap<String, u64>,
    idx_path: PathBuf,
    current_offset: u64,
}

impl DocStoreWriter {
    /// Append a node
    pub fn add(&mut self, node: &Node) -> anyhow::Result<()> {
        if self.offsets.contains_key(&node.id) {
            anyhow::bail!("Duplicate node id: {}", node.id);
        }
        self.offsets.insert(node.id.clone(), self.current_offset);

        let json = serde_json::to_string(node)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;

        self.current_offset += json.len() as u64 + 1;

        Ok(())
    }

    /// Flush and save the offset index
    pub fn finish(mut self) -> anyhow::Result<usize> {
        self.writer.flush()?;

        let idx_content = serde_json::to_string(&self.offsets)?;
        std::fs::write(&self.idx_path, idx_content)?;

        Ok(self.offsets.len())
    }
}
