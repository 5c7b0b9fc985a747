use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::chunker::Chunker;
use crate::config::Settings;
use crate::types::{Chunk, Document};
use crate::Result;

const MARKDOWN_EXT: &str = "md";

/// Loads the Markdown files of a knowledge-base directory and chunks them.
///
/// Loading is fail-soft: a missing directory yields no documents and an
/// unreadable file is skipped, never aborting the rest of the corpus.
#[derive(Debug, Clone, Default)]
pub struct DataProcessor {
    chunker: Chunker,
    max_documents: Option<usize>,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_chunker(chunker: Chunker) -> Self { Self { chunker, max_documents: None } }

    /// Chunking and document limit taken from `[chunking]` and `kb.max_documents`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let processor = Self::with_chunker(Chunker::new(settings.chunking)?);
        Ok(match settings.kb.max_documents {
            Some(limit) => processor.with_max_documents(limit),
            None => processor,
        })
    }

    /// Only the first `limit` files (in path order) are loaded.
    pub fn with_max_documents(mut self, limit: usize) -> Self {
        self.max_documents = Some(limit);
        self
    }

    pub fn process_directory(&self, data_dir: &Path) -> Vec<Chunk> {
        let documents = self.load_documents(data_dir);
        let chunks: Vec<Chunk> = documents.iter().flat_map(|doc| self.chunker.chunk_document(doc)).collect();
        info!("Processed {} documents into {} chunks", documents.len(), chunks.len());
        chunks
    }

    pub fn load_documents(&self, data_dir: &Path) -> Vec<Document> {
        if !data_dir.is_dir() {
            warn!("Knowledge base directory {} does not exist; continuing with an empty corpus", data_dir.display());
            return Vec::new();
        }
        let mut files = self.list_markdown_files(data_dir);
        if let Some(limit) = self.max_documents {
            if files.len() > limit {
                warn!("Limiting corpus to the first {} of {} files", limit, files.len());
                files.truncate(limit);
            }
        }

        let mut documents = Vec::with_capacity(files.len());
        for file_path in &files {
            let Some(id) = extract_doc_id(file_path) else { continue };
            let content = match fs::read_to_string(file_path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to read {}: {}", file_path.display(), e);
                    continue;
                }
            };
            let text = content.trim();
            if text.is_empty() {
                debug!("Skipping empty document {}", file_path.display());
                continue;
            }
            debug!("Loaded {} ({} chars)", id, text.chars().count());
            documents.push(Document { id, text: text.to_string() });
        }
        documents
    }

    fn list_markdown_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut md_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => { warn!("Skipping unreadable entry under {}: {}", root.display(), err); None }
            })
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| p.extension().and_then(|s| s.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXT)))
            .collect();
        md_files.sort();
        md_files
    }
}

fn extract_doc_id(file_path: &Path) -> Option<String> {
    file_path.file_stem().map(|stem| stem.to_string_lossy().to_string())
}
