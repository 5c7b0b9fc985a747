//! kb-text
//!
//! TF-IDF vector-space model over chunk texts: tantivy-based analysis,
//! vocabulary fitting, query projection and cosine ranking.

pub mod tantivy_utils;
pub mod index;
pub mod search;

pub use index::{TfIdfIndex, TfIdfVectorizer};
pub use search::{cosine_similarity, top_k};
