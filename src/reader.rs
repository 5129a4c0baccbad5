//! Directory reader - turns files under the input roots into documents

use std::path::{Path, PathBuf};

use anyhow::Context;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::IndexConfig;
use crate::error::Error;

/// One ingested file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Document {
    /// Source path recorded at load time
    pub fn file_path(&self) -> Option<&str> {
        self.metadata.get("file_path").and_then(|v| v.as_str())
    }
}

/// Recursive reader over one or more root directories
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    roots: Vec<PathBuf>,
    /// Normalized to a leading dot, lowercase
    file_types: Option<Vec<String>>,
    include_hidden: bool,
    respect_gitignore: bool,
    max_file_size: Option<u64>,
}

impl DirectoryReader {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            file_types: None,
            include_hidden: false,
            respect_gitignore: false,
            max_file_size: None,
        }
    }

    pub fn from_config(config: &IndexConfig) -> Self {
        Self::new(config.roots.clone())
            .with_file_types(config.file_types.clone())
            .with_hidden(config.include_hidden)
            .with_gitignore(config.respect_gitignore)
            .with_max_file_size_kb(config.max_file_size_kb)
    }

    /// Restrict to these extensions (".md" and "md" are equivalent)
    pub fn with_file_types(mut self, file_types: Option<Vec<String>>) -> Self {
        self.file_types = file_types.map(|types| {
            types
                .iter()
                .map(|t| t.trim().trim_start_matches('.').to_lowercase())
                .filter(|t| !t.is_empty())
                .map(|t| format!(".{}", t))
                .collect()
        });
        self
    }

    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    /// Apply `.gitignore`, `.ignore` and global git excludes while walking
    pub fn with_gitignore(mut self, respect_gitignore: bool) -> Self {
        self.respect_gitignore = respect_gitignore;
        self
    }

    /// Skip files larger than this; 0 disables the limit
    pub fn with_max_file_size_kb(mut self, kb: u64) -> Self {
        self.max_file_size = (kb > 0).then_some(kb.saturating_mul(1024));
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Check that every root exists and is a directory
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.roots.is_empty() {
            anyhow::bail!("No input directories configured");
        }
        for root in &self.roots {
            if !root.is_dir() {
                return Err(Error::RootNotFound(root.clone()).into());
            }
        }
        Ok(())
    }

    /// Load every readable file, first root fully before the next,
    /// files in sorted order within each directory
    pub fn load_data(&self) -> anyhow::Result<Vec<Document>> {
        self.validate()?;

        let mut documents = Vec::new();

        for root in &self.roots {
            let walker = WalkBuilder::new(root)
                .hidden(!self.include_hidden)
                .ignore(self.respect_gitignore)
                .git_ignore(self.respect_gitignore)
                .git_global(self.respect_gitignore)
                .git_exclude(self.respect_gitignore)
                .parents(self.respect_gitignore)
                .sort_by_file_name(|a, b| a.cmp(b))
                .build();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                        continue;
                    }
                };

                let path = entry.path();
                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    continue;
                }
                if !self.accepts(path) {
                    continue;
                }
                if let Some(limit) = self.max_file_size {
                    let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                    if size > limit {
                        debug!("Skipping {} ({} bytes over limit)", path.display(), size);
                        continue;
                    }
                }

                let Some(text) = load_file_content(path) else {
                    continue;
                };
                if text.trim().is_empty() {
                    debug!("Skipping empty file {}", path.display());
                    continue;
                }

                documents.push(Document {
                    id: documents.len().to_string(),
                    text,
                    metadata: file_metadata(path),
                });
            }
        }

        debug!("Loaded {} documents from {} roots", documents.len(), self.roots.len());
        Ok(documents)
    }

    fn accepts(&self, path: &Path) -> bool {
        let Some(allowed) = &self.file_types else {
            return true;
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        allowed.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

fn file_metadata(path: &Path) -> serde_json::Value {
    serde_json::json!({
        "file_path": path.to_string_lossy(),
        "file_name": path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
        "extension": path.extension().map(|e| e.to_string_lossy().to_string()).unwrap_or_default(),
    })
}

/// Load file content, handling different file types
fn load_file_content(path: &Path) -> Option<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        #[cfg(feature = "pdf")]
        "pdf" => match pdf_extract::extract_text(path) {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                warn!("Failed to extract text from {}: {}", path.display(), e);
                None
            }
        },
        _ => match std::fs::read_to_string(path)
            .with_context(|| format!("Skipping {}", path.display()))
        {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("{:#}", e);
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &[u8]) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_loads_roots_in_order() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        write(a.path(), "z.txt", b"last in a");
        write(a.path(), "nested/m.md", b"middle in a");
        write(a.path(), "b.txt", b"first in a");
        write(b.path(), "a.txt", b"only in b");

        let reader = DirectoryReader::new(vec![a.path().to_path_buf(), b.path().to_path_buf()]);
        let docs = reader.load_data().unwrap();

        let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, ["first in a", "middle in a", "last in a", "only in b"]);
        assert_eq!(docs[0].id, "0");
        assert_eq!(docs[3].id, "3");
        assert!(docs[1].file_path().unwrap().ends_with("m.md"));
        assert_eq!(docs[1].metadata["file_name"], "m.md");
    }

    #[test]
    fn test_missing_root() {
        let a = tempfile::tempdir().unwrap();
        let missing = a.path().join("nope");
        let reader = DirectoryReader::new(vec![a.path().to_path_buf(), missing.clone()]);

        let err = reader.load_data().unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::RootNotFound(p)) => assert_eq!(p, &missing),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_skips_binary_hidden_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", b"keep me");
        write(dir.path(), "blob.bin", &[0xff, 0xfe, 0x00, 0x80]);
        write(dir.path(), ".secret", b"hidden");
        write(dir.path(), "empty.txt", b"  \n");

        let docs = DirectoryReader::new(vec![dir.path().to_path_buf()])
            .load_data()
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "keep me");

        let docs = DirectoryReader::new(vec![dir.path().to_path_buf()])
            .with_hidden(true)
            .load_data()
            .unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_file_type_filter() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", b"markdown");
        write(dir.path(), "b.rs", b"fn main() {}");

        let docs = DirectoryReader::new(vec![dir.path().to_path_buf()])
            .with_file_types(Some(vec!["MD".to_string()]))
            .load_data()
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata["extension"], "md");
    }

    #[test]
    fn test_max_file_size() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "small.txt", b"tiny");
        write(dir.path(), "big.txt", &vec![b'a'; 2048]);

        let docs = DirectoryReader::new(vec![dir.path().to_path_buf()])
            .with_max_file_size_kb(1)
            .load_data()
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "tiny");
    }

    #[test]
    fn test_gitignored_files_are_still_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        write(dir.path(), ".gitignore", b"*.log\n");
        write(dir.path(), "data/hello.txt", b"hello");
        write(dir.path(), "data/server.log", b"request served");
        let root = dir.path().join("data");

        let docs = DirectoryReader::new(vec![root.clone()]).load_data().unwrap();
        let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, ["hello", "request served"]);

        let docs = DirectoryReader::new(vec![root])
            .with_gitignore(true)
            .load_data()
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "hello");
    }

    #[test]
    fn test_huge_size_limit_saturates() {
        let reader = DirectoryReader::new(vec![]).with_max_file_size_kb(u64::MAX);
        assert_eq!(reader.max_file_size, Some(u64::MAX));
    }
}
