//! Domain types shared by the loader, the vector-space model and the query engine.

use serde::{Deserialize, Serialize};

pub type DocumentId = String;

/// A knowledge-base file loaded from disk.
///
/// - `id`: file stem of the source file (`refunds.md` -> `refunds`)
/// - `text`: file contents with surrounding whitespace trimmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub text: String,
}

/// A bounded piece of a document; the unit of indexing and scoring.
///
/// `source_id` points back at the owning `Document::id`. `chunk_index` is the
/// position of the chunk inside that document, starting at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_id: DocumentId,
    pub chunk_index: usize,
}

/// A ranked hit returned by the query engine.
///
/// `score` is the cosine similarity between query and chunk; always > 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub source_id: DocumentId,
    pub excerpt: String,
    pub score: f32,
}

/// What the generation step actually consumes: a hit without its score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub source_id: DocumentId,
    pub excerpt: String,
}

impl From<QueryResult> for Snippet {
    fn from(r: QueryResult) -> Self {
        Self { source_id: r.source_id, excerpt: r.excerpt }
    }
}

/// Summary of a built index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
    pub vocabulary: usize,
}

/// Sparse weight vector: `(column, weight)` pairs sorted by column, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub entries: Vec<(u32, f32)>,
}

impl SparseVector {
    pub fn new(mut entries: Vec<(u32, f32)>) -> Self {
        entries.sort_by_key(|(col, _)| *col);
        entries.dedup_by_key(|(col, _)| *col);
        Self { entries }
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Scale to unit length. Zero vectors are left untouched.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries { *w /= norm; }
        }
    }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0f32);
        while i < self.entries.len() && j < other.entries.len() {
            let (ca, wa) = self.entries[i];
            let (cb, wb) = other.entries[j];
            match ca.cmp(&cb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => { sum += wa * wb; i += 1; j += 1; }
            }
        }
        sum
    }
}
