//! docrag-index - build the document index and persist it

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use crate::config::API_BASE_VAR;
use crate::embedding::create_embedder;
use crate::indexer::Indexer;

/// Build a vector index over document directories and persist it to disk
#[derive(Parser, Debug)]
#[command(name = "docrag-index")]
#[command(author, version, about, long_about = None)]
pub struct IndexArgs {
    /// Document directory to index; repeat for several (default: `roots` from config)
    #[arg(long = "docs", value_name = "DIR")]
    pub docs: Vec<PathBuf>,

    /// Directory the index is written to (default: `persist_dir` from config)
    #[arg(long, value_name = "DIR")]
    pub persist_dir: Option<PathBuf>,

    /// Embedding model name
    #[arg(long, env = "DOCRAG_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = API_BASE_VAR)]
    pub api_base: Option<String>,

    /// Config file
    #[arg(long, env = "DOCRAG_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,
}

/// Entry point for the `docrag-index` binary
pub async fn main() -> ExitCode {
    let args = match super::parse_args::<IndexArgs>() {
        Ok(args) => args,
        Err(code) => return code,
    };
    super::init_tracing();
    super::finish(run(args).await)
}

pub async fn run(args: IndexArgs) -> anyhow::Result<()> {
    let mut settings = super::load_settings(args.config.as_deref(), args.api_base)?;

    if !args.docs.is_empty() {
        settings.index.roots = args.docs;
    }
    if let Some(persist_dir) = args.persist_dir {
        settings.index.persist_dir = persist_dir;
    }
    if let Some(model) = args.embedding_model {
        settings.embedding.model = model;
    }

    info!(
        "Indexing {} root(s) into {:?}",
        settings.index.roots.len(),
        settings.index.persist_dir
    );

    let embedder = create_embedder(&settings, &settings.embedding.model)?;
    let meta = Indexer::new(&settings.index, embedder.as_ref())
        .with_batch_size(settings.embedding.batch_size)
        .with_progress(!args.quiet)
        .run()
        .await?;

    println!(
        "Index built successfully at {}",
        settings.index.persist_dir.display()
    );
    println!("  Documents: {}", meta.document_count);
    println!("  Nodes: {}", meta.node_count);
    println!("  Dimensions: {}", meta.dimensions);

    Ok(())
}
