//! Overlapping, sentence-aware splitting of document text.
//!
//! Positions and sizes are counted in characters, not bytes.

use serde::{Deserialize, Serialize};

use crate::types::{Chunk, Document};
use crate::{Error, Result};

const BOUNDARY_CHARS: [char; 4] = ['.', '!', '?', '\n'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk length.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub overlap: usize,
    /// How far back from a hard cut to look for a sentence or line end.
    pub boundary_window: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 500, overlap: 100, boundary_window: 100 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be greater than zero".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Split `text` into trimmed, non-empty chunks in document order.
    pub fn split(&self, text: &str) -> Vec<String> {
        let ChunkingConfig { chunk_size, overlap, boundary_window } = self.config;
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        if len <= chunk_size {
            let whole = text.trim();
            return if whole.is_empty() { Vec::new() } else { vec![whole.to_string()] };
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < len {
            let mut end = start + chunk_size;
            if end < len {
                let floor = (start + chunk_size / 2).max(end.saturating_sub(boundary_window));
                if let Some(pos) = (floor + 1..=end).rev().find(|&i| BOUNDARY_CHARS.contains(&chars[i])) {
                    end = pos + 1;
                }
            }

            let piece: String = chars[start..end.min(len)].iter().collect();
            let piece = piece.trim();
            if !piece.is_empty() {
                chunks.push(piece.to_string());
            }

            // A snapped end closer to `start` than `overlap` would move backwards.
            let next = end.saturating_sub(overlap);
            start = if next > start { next } else { end };
        }
        chunks
    }

    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        self.split(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Chunk { text, source_id: doc.id.clone(), chunk_index })
            .collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self { config: ChunkingConfig::default() }
    }
}
