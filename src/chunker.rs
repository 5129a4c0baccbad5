//! Text chunking - splits documents into retrievable nodes

use serde::{Deserialize, Serialize};

use crate::reader::Document;

/// A chunk of a document; the unit that gets embedded and retrieved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Character-based chunker with word boundary awareness
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Approximate chunk size in tokens (1 token ~= 4 chars)
    chunk_size: usize,
    /// Overlap size in tokens
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            // Overlap must leave room for progress
            chunk_overlap: chunk_overlap.min(chunk_size / 2),
        }
    }

    /// Split every document, preserving document order
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Node> {
        documents.iter().flat_map(|doc| self.split(doc)).collect()
    }

    /// Split one document into nodes
    pub fn split(&self, document: &Document) -> Vec<Node> {
        self.split_text(&document.text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| {
                let mut metadata = match &document.metadata {
                    serde_json::Value::Object(map) => map.clone(),
                    _ => serde_json::Map::new(),
                };
                metadata.insert("document_id".into(), document.id.clone().into());
                metadata.insert("chunk_index".into(), chunk_index.into());

                Node {
                    id: format!("{}-{}", document.id, chunk_index),
                    text,
                    metadata: serde_json::Value::Object(metadata),
                }
            })
            .collect()
    }

    /// Split raw text into trimmed, non-empty chunks
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let char_chunk_size = self.chunk_size * 4;
        let char_overlap = self.chunk_overlap * 4;

        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if text.len() <= char_chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let end = floor_char_boundary(text, (start + char_chunk_size).min(text.len()));

            // Try to break at word boundary
            let chunk_end = if end < text.len() {
                text[start..end]
                    .rfind(char::is_whitespace)
                    .map(|pos| start + pos)
                    .filter(|&pos| pos > start)
                    .unwrap_or(end)
            } else {
                end
            };

            let chunk = text[start..chunk_end].trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }

            if chunk_end >= text.len() {
                break;
            }

            // Move start back by the overlap, but always forward overall
            let mut next = floor_char_boundary(text, chunk_end.saturating_sub(char_overlap));
            if next > 0 && !text[..next].ends_with(char::is_whitespace) {
                // Don't start mid-word
                if let Some(pos) = text[next..chunk_end].find(char::is_whitespace) {
                    next += pos;
                }
            }
            start = if next > start { next } else { chunk_end };
        }

        chunks
    }
}

/// Largest char boundary at or below `idx`
fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> Document {
        Document {
            id: id.to_string(),
            text: text.to_string(),
            metadata: serde_json::json!({ "file_path": format!("/tmp/{}.txt", id) }),
        }
    }

    #[test]
    fn test_short_text_single_node() {
        let chunker = TextChunker::new(64, 8);
        let nodes = chunker.split(&doc("0", "The sky is blue."));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "0-0");
        assert_eq!(nodes[0].text, "The sky is blue.");
        assert_eq!(nodes[0].metadata["file_path"], "/tmp/0.txt");
        assert_eq!(nodes[0].metadata["document_id"], "0");
        assert_eq!(nodes[0].metadata["chunk_index"], 0);
    }

    #[test]
    fn test_blank_text_no_nodes() {
        let chunker = TextChunker::new(64, 8);
        assert!(chunker.split(&doc("0", " \n\t ")).is_empty());
    }

    #[test]
    fn test_long_text_overlaps_and_covers() {
        let words: Vec<String> = (0..400).map(|i| format!("word{}", i)).collect();
        let text = words.join(" ");
        let chunker = TextChunker::new(32, 8);

        let chunks = chunker.split_text(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 32 * 4);
            // Word boundaries are respected
            assert!(chunk.split(' ').all(|w| w.starts_with("word")));
        }
        assert!(chunks[0].starts_with("word0 "));
        assert!(chunks.last().unwrap().ends_with("word399"));

        let last_of_first = chunks[0].split(' ').last().unwrap();
        assert!(chunks[1].contains(last_of_first));
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let text = "héllo wörld ünïcødé ".repeat(100);
        let chunks = TextChunker::new(8, 2).split_text(&text);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_split_documents_keeps_order() {
        let chunker = TextChunker::new(64, 8);
        let nodes = chunker.split_documents(&[doc("0", "first"), doc("1", "second")]);
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["0-0", "1-0"]);
    }
}
