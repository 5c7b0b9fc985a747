use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use kb_core::config::Config;
use kb_core::data_processor::DataProcessor;
use kb_core::logging;
use kb_retrieval::RetrievalEngine;

#[derive(Parser, Debug)]
#[command(name = "kb", about = "Query a Markdown knowledge base", version)]
struct Cli {
    /// Project root holding config.toml (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Knowledge base directory, overriding `kb.dir`
    #[arg(long, global = true)]
    kb_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank knowledge-base chunks against a query
    Query {
        text: String,
        /// Number of results, overriding `query.top_k`
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Print the chunks the index would be built from
    Chunks {
        #[arg(long)]
        json: bool,
    },
    /// Build the index and print its size
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.root {
        Some(root) => Config::load_from(root),
        None => Config::load(),
    }
    .context("loading configuration")?;
    let mut settings = config.settings().context("reading settings")?;
    logging::init_with_config(&settings.logging);
    if let Some(dir) = cli.kb_dir {
        settings.kb.dir = dir;
    }

    match cli.command {
        Command::Query { text, top_k, json } => {
            let mut engine = RetrievalEngine::from_settings(&settings)?;
            if let Some(k) = top_k {
                engine = engine.with_top_k(k);
            }
            let results = engine.retrieve(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                return Ok(());
            }
            println!("🔍 {} results for \"{}\" in {}", results.len(), text, engine.corpus_dir().display());
            for (i, result) in results.iter().enumerate() {
                println!("\n  {}. score={:.4}  source={}", i + 1, result.score, result.source_id);
                println!("     {}", result.excerpt.replace('\n', "\n     "));
            }
        }
        Command::Chunks { json } => {
            let processor = DataProcessor::from_settings(&settings)?;
            let chunks = processor.process_directory(&settings.corpus_dir());
            if json {
                println!("{}", serde_json::to_string_pretty(&chunks)?);
                return Ok(());
            }
            for chunk in &chunks {
                println!("[{}#{}] {} chars", chunk.source_id, chunk.chunk_index, chunk.text.chars().count());
            }
            println!("📊 {} chunks", chunks.len());
        }
        Command::Stats => {
            let engine = RetrievalEngine::from_settings(&settings)?;
            let stats = engine.warm_up()?;
            println!("Knowledge base: {}", engine.corpus_dir().display());
            println!("  documents:  {}", stats.documents);
            println!("  chunks:     {}", stats.chunks);
            println!("  vocabulary: {}", stats.vocabulary);
        }
    }
    Ok(())
}
