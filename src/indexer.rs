//! Indexing pipeline: read documents, chunk, embed, persist

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::chunker::TextChunker;
use crate::config::IndexConfig;
use crate::embedding::Embedder;
use crate::error::Error;
use crate::index::{IndexBuilder, IndexMeta};
use crate::reader::DirectoryReader;

/// Builds and persists an index from the configured roots
pub struct Indexer<'a> {
    config: &'a IndexConfig,
    embedder: &'a dyn Embedder,
    batch_size: usize,
    show_progress: bool,
}

impl<'a> Indexer<'a> {
    pub fn new(config: &'a IndexConfig, embedder: &'a dyn Embedder) -> Self {
        Self {
            config,
            embedder,
            batch_size: 100,
            show_progress: false,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Draw progress bars on stderr
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run the whole pipeline. Nothing is written unless every step succeeds.
    pub async fn run(&self) -> anyhow::Result<IndexMeta> {
        let reader = DirectoryReader::from_config(self.config);

        let spinner = self.spinner()?;
        spinner.set_message("Loading documents...");
        let documents = reader.load_data()?;
        spinner.finish_with_message(format!("Loaded {} documents", documents.len()));

        if documents.is_empty() {
            return Err(Error::NoDocuments(self.config.roots.clone()).into());
        }

        let chunker = TextChunker::new(self.config.chunk_size, self.config.chunk_overlap);
        let nodes = chunker.split_documents(&documents);
        if nodes.is_empty() {
            return Err(Error::NoDocuments(self.config.roots.clone()).into());
        }
        info!("Split {} documents into {} nodes", documents.len(), nodes.len());

        let progress = self.bar(nodes.len() as u64)?;
        progress.set_message("Computing embeddings...");

        let mut embeddings = Vec::with_capacity(nodes.len());
        for batch in nodes.chunks(self.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|n| n.text.as_str()).collect();
            let batch_embeddings = self.embedder.embed(&texts).await?;
            if batch_embeddings.len() != texts.len() {
                anyhow::bail!(
                    "Embedding provider returned {} vectors for {} texts",
                    batch_embeddings.len(),
                    texts.len()
                );
            }
            embeddings.extend(batch_embeddings);
            progress.inc(batch.len() as u64);
        }
        progress.finish_with_message("Embeddings computed");

        let mut builder = IndexBuilder::new(self.embedder.model_name())
            .with_source(&self.config.roots, documents.len())
            .with_graph_params(self.config.connectivity, self.config.expansion);
        for (node, embedding) in nodes.into_iter().zip(embeddings) {
            builder.add_node(node, embedding)?;
        }

        builder.persist(&self.config.persist_dir)
    }

    fn spinner(&self) -> anyhow::Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        Ok(spinner)
    }

    fn bar(&self, len: u64) -> anyhow::Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("#>-"),
        );
        Ok(bar)
    }
}
