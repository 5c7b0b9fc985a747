use std::env;
use std::path::PathBuf;

use kb_core::data_processor::DataProcessor;
use kb_core::traits::{FittedModel, VectorSpaceModel};
use kb_text::{top_k, TfIdfVectorizer};

// Fit TF-IDF over a knowledge-base directory and print the best chunks.
// Usage:
//   cargo run -p kb-text --example score -- "your query" [data/kb] [--limit 5]

fn main() -> kb_core::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: cargo run -p kb-text --example score -- <query> [kb_dir] [--limit N]");
        std::process::exit(1);
    }
    let query = &args[0];
    let mut kb_dir = PathBuf::from("data/kb");
    let mut limit = 5usize;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                if i + 1 >= args.len() { eprintln!("--limit requires a number"); std::process::exit(2); }
                limit = args[i + 1].parse().unwrap_or(limit);
                i += 2;
            }
            s => { kb_dir = PathBuf::from(s); i += 1; }
        }
    }

    let chunks = DataProcessor::new().process_directory(&kb_dir);
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let index = TfIdfVectorizer::default().fit(&texts)?;
    println!("{} chunks, {} terms from {}", index.num_rows(), index.vocabulary_len(), kb_dir.display());

    let scores = index.similarities(&index.transform(query)?)?;
    for (rank, (row, score)) in top_k(&scores, limit).into_iter().enumerate() {
        let chunk = &chunks[row];
        println!("{}. {:.4} {}#{}: {}", rank + 1, score, chunk.source_id, chunk.chunk_index, chunk.text);
    }
    Ok(())
}
