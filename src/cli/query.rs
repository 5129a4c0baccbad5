//! docrag-query - answer one question against the persisted index

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use crate::config::API_BASE_VAR;
use crate::embedding::create_embedder;
use crate::engine::QueryEngine;
use crate::index::VectorIndex;
use crate::llm::create_llm;

/// Answer a question from the persisted document index
#[derive(Parser, Debug)]
#[command(name = "docrag-query")]
#[command(author, version, about, long_about = None)]
pub struct QueryArgs {
    /// Question to ask
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Directory holding the persisted index (default: `persist_dir` from config)
    #[arg(long, value_name = "DIR")]
    pub persist_dir: Option<PathBuf>,

    /// LLM model name
    #[arg(long, env = "DOCRAG_LLM_MODEL")]
    pub model: Option<String>,

    /// Number of nodes to retrieve
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Print the source files the answer was drawn from
    #[arg(long)]
    pub show_sources: bool,

    /// OpenAI-compatible API base URL
    #[arg(long, env = API_BASE_VAR)]
    pub api_base: Option<String>,

    /// Config file
    #[arg(long, env = "DOCRAG_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Entry point for the `docrag-query` binary
pub async fn main() -> ExitCode {
    let args = match super::parse_args::<QueryArgs>() {
        Ok(args) => args,
        Err(code) => return code,
    };

    let Some(query) = args.query.clone().filter(|q| !q.trim().is_empty()) else {
        eprintln!("{}", QueryArgs::command().render_usage());
        eprintln!("\nA query is required, e.g. docrag-query \"What does this project do?\"");
        return ExitCode::from(super::USAGE_EXIT);
    };

    super::init_tracing();
    super::finish(run(args, &query).await)
}

pub async fn run(args: QueryArgs, query: &str) -> anyhow::Result<()> {
    let settings = super::load_settings(args.config.as_deref(), args.api_base)?;

    let persist_dir = args
        .persist_dir
        .unwrap_or_else(|| settings.index.persist_dir.clone());
    let index = VectorIndex::load(&persist_dir)?;

    // Queries must be embedded with the model the index was built with
    let embedding_model = index.meta().embedding_model.clone();
    let embedder = create_embedder(&settings, &embedding_model)?;

    let model = args.model.unwrap_or_else(|| settings.llm.model.clone());
    let llm = create_llm(&settings, &model)?;

    let engine = QueryEngine::new(index, embedder, llm)?
        .with_top_k(args.top_k.unwrap_or(settings.index.top_k));

    let response = engine.query(query).await?;
    println!("{}", response);

    if args.show_sources {
        println!("\nSources:");
        for (i, source) in response.source_nodes.iter().enumerate() {
            println!("  [{}] {} (score {:.3})", i + 1, source.source(), source.score);
        }
    }

    Ok(())
}
