use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use kb_core::traits::{FittedModel, VectorSpaceModel};
use kb_core::types::SparseVector;
use kb_core::{Error, Result};

use crate::search::cosine_similarity;
use crate::tantivy_utils::TermExtractor;

pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Learns a TF-IDF weighting over chunk texts.
///
/// - features: unigrams and bigrams after stop-word removal
/// - vocabulary: capped at `max_features`, keeping the terms with the highest
///   total count (ties by term text); columns are numbered in term order
/// - idf: `ln((1 + n) / (1 + df)) + 1`
/// - rows: raw count times idf, scaled to unit length
#[derive(Clone)]
pub struct TfIdfVectorizer {
	extractor: TermExtractor,
	max_features: usize,
}

impl TfIdfVectorizer {
	pub fn new(max_features: usize) -> Self { Self { extractor: TermExtractor::default(), max_features } }

	pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Result<Self> {
		if min_n == 0 || min_n > max_n {
			return Err(Error::InvalidConfig(format!("invalid n-gram range ({}, {})", min_n, max_n)));
		}
		self.extractor = TermExtractor::new((min_n, max_n));
		Ok(self)
	}
}

impl Default for TfIdfVectorizer {
	fn default() -> Self { Self::new(DEFAULT_MAX_FEATURES) }
}

impl VectorSpaceModel for TfIdfVectorizer {
	type Fitted = TfIdfIndex;

	fn fit(&self, texts: &[&str]) -> Result<TfIdfIndex> {
		let started = Instant::now();
		if texts.is_empty() {
			return Ok(TfIdfIndex::empty(self.extractor.clone()));
		}

		let doc_counts: Vec<HashMap<String, u32>> = texts.iter().map(|t| self.extractor.term_counts(t)).collect();
		let mut doc_freq: HashMap<&str, u32> = HashMap::new();
		let mut total_freq: HashMap<&str, u64> = HashMap::new();
		for counts in &doc_counts {
			for (term, count) in counts {
				*doc_freq.entry(term.as_str()).or_insert(0) += 1;
				*total_freq.entry(term.as_str()).or_insert(0) += u64::from(*count);
			}
		}

		let mut selected: Vec<&str> = doc_freq.keys().copied().collect();
		if selected.len() > self.max_features {
			selected.sort_unstable_by(|a, b| total_freq[b].cmp(&total_freq[a]).then_with(|| a.cmp(b)));
			selected.truncate(self.max_features);
		}
		selected.sort_unstable();

		let n = texts.len() as f32;
		let idf: Vec<f32> = selected.iter().map(|t| ((1.0 + n) / (1.0 + doc_freq[t] as f32)).ln() + 1.0).collect();
		let vocabulary: HashMap<String, u32> = selected.iter().enumerate().map(|(col, t)| ((*t).to_string(), col as u32)).collect();
		let terms: Vec<String> = selected.iter().map(|t| (*t).to_string()).collect();
		let rows: Vec<SparseVector> = doc_counts.iter().map(|counts| weigh(counts, &vocabulary, &idf)).collect();

		debug!(
			"Fitted TF-IDF over {} texts: {} distinct features, {} kept, {:?}",
			texts.len(), doc_freq.len(), terms.len(), started.elapsed()
		);
		Ok(TfIdfIndex { extractor: self.extractor.clone(), vocabulary, terms, idf, rows })
	}
}

/// A fitted TF-IDF model: vocabulary, idf weights and one unit row per text.
pub struct TfIdfIndex {
	extractor: TermExtractor,
	vocabulary: HashMap<String, u32>,
	terms: Vec<String>,
	idf: Vec<f32>,
	rows: Vec<SparseVector>,
}

impl TfIdfIndex {
	fn empty(extractor: TermExtractor) -> Self {
		Self { extractor, vocabulary: HashMap::new(), terms: Vec::new(), idf: Vec::new(), rows: Vec::new() }
	}

	/// Vocabulary terms in column order.
	pub fn terms(&self) -> &[String] { &self.terms }

	pub fn column(&self, term: &str) -> Option<u32> { self.vocabulary.get(term).copied() }

	pub fn idf(&self, term: &str) -> Option<f32> { self.column(term).map(|col| self.idf[col as usize]) }

	pub fn row(&self, i: usize) -> Option<&SparseVector> { self.rows.get(i) }
}

impl FittedModel for TfIdfIndex {
	fn num_rows(&self) -> usize { self.rows.len() }

	fn vocabulary_len(&self) -> usize { self.terms.len() }

	fn transform(&self, text: &str) -> Result<SparseVector> {
		Ok(weigh(&self.extractor.term_counts(text), &self.vocabulary, &self.idf))
	}

	fn similarities(&self, query: &SparseVector) -> Result<Vec<f32>> {
		if let Some((col, _)) = query.entries.iter().find(|(col, _)| *col as usize >= self.idf.len()) {
			return Err(Error::Operation(format!("query column {} outside vocabulary of {}", col, self.idf.len())));
		}
		self.rows
			.iter()
			.enumerate()
			.map(|(i, row)| {
				let score = cosine_similarity(query, row);
				if score.is_finite() { Ok(score) } else { Err(Error::Operation(format!("non-finite similarity for row {}", i))) }
			})
			.collect()
	}
}

fn weigh(counts: &HashMap<String, u32>, vocabulary: &HashMap<String, u32>, idf: &[f32]) -> SparseVector {
	let entries = counts
		.iter()
		.filter_map(|(term, count)| vocabulary.get(term).map(|&col| (col, *count as f32 * idf[col as usize])))
		.collect();
	let mut vector = SparseVector::new(entries);
	vector.normalize();
	vector
}
