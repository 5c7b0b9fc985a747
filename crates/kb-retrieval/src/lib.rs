//! kb-retrieval
//!
//! Query engine over a Markdown knowledge base. The vector-space index is
//! built on the first query (or on `warm_up`) and then shared read-only by
//! every caller for the life of the engine. Hand the engine to collaborators
//! as `Arc<RetrievalEngine>` or `Arc<dyn Retriever>`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use kb_core::config::Settings;
use kb_core::data_processor::DataProcessor;
use kb_core::traits::{FittedModel, Retriever, VectorSpaceModel};
use kb_core::types::{Chunk, IndexStats, QueryResult, Snippet};
use kb_core::{Error, Result};
use kb_text::{top_k, TfIdfVectorizer};

pub const DEFAULT_TOP_K: usize = 3;

/// Chunks and the model fitted on them. Row `i` of the model scores `chunks[i]`.
pub struct KnowledgeIndex<F> {
    chunks: Vec<Chunk>,
    model: F,
}

impl<F: FittedModel> KnowledgeIndex<F> {
    pub fn chunks(&self) -> &[Chunk] { &self.chunks }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn stats(&self) -> IndexStats {
        let documents = self.chunks.iter().map(|c| c.source_id.as_str()).collect::<HashSet<_>>().len();
        IndexStats { documents, chunks: self.chunks.len(), vocabulary: self.model.vocabulary_len() }
    }
}

pub struct RetrievalEngine<M: VectorSpaceModel = TfIdfVectorizer> {
    corpus_dir: PathBuf,
    processor: DataProcessor,
    model: M,
    top_k: usize,
    index: OnceLock<Arc<KnowledgeIndex<M::Fitted>>>,
    build_gate: Mutex<()>,
}

impl RetrievalEngine<TfIdfVectorizer> {
    /// Default chunking, TF-IDF with a 5000-term vocabulary, top 3.
    pub fn new(corpus_dir: impl Into<PathBuf>) -> Self {
        Self::with_model(corpus_dir, DataProcessor::new(), TfIdfVectorizer::default())
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let processor = DataProcessor::from_settings(settings)?;
        let model = TfIdfVectorizer::new(settings.index.max_features);
        Ok(Self::with_model(settings.corpus_dir(), processor, model).with_top_k(settings.query.top_k))
    }
}

impl<M: VectorSpaceModel> RetrievalEngine<M> {
    pub fn with_model(corpus_dir: impl Into<PathBuf>, processor: DataProcessor, model: M) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
            processor,
            model,
            top_k: DEFAULT_TOP_K,
            index: OnceLock::new(),
            build_gate: Mutex::new(()),
        }
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    pub fn corpus_dir(&self) -> &Path { &self.corpus_dir }

    pub fn top_k(&self) -> usize { self.top_k }

    pub fn is_built(&self) -> bool { self.index.get().is_some() }

    /// `None` until the index has been built.
    pub fn stats(&self) -> Option<IndexStats> { self.index.get().map(|index| index.stats()) }

    /// Build the index now instead of on the first query.
    pub fn warm_up(&self) -> Result<IndexStats> { Ok(self.index()?.stats()) }

    /// The shared index, building it if this is the first access.
    pub fn index(&self) -> Result<Arc<KnowledgeIndex<M::Fitted>>> {
        if let Some(index) = self.index.get() {
            return Ok(Arc::clone(index));
        }
        let _gate = self
            .build_gate
            .lock()
            .map_err(|_| Error::Operation("index build gate poisoned".to_string()))?;
        if let Some(index) = self.index.get() {
            return Ok(Arc::clone(index));
        }
        let built = Arc::new(self.build()?);
        // Only the gate holder writes the cell, so it is still empty here.
        let _ = self.index.set(Arc::clone(&built));
        Ok(built)
    }

    fn build(&self) -> Result<KnowledgeIndex<M::Fitted>> {
        let started = Instant::now();
        let chunks = self.processor.process_directory(&self.corpus_dir);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let model = self.model.fit(&texts)?;
        if model.num_rows() != chunks.len() {
            return Err(Error::Operation(format!(
                "model produced {} rows for {} chunks",
                model.num_rows(),
                chunks.len()
            )));
        }
        let index = KnowledgeIndex { chunks, model };
        let stats = index.stats();
        info!(
            "Built knowledge index from {}: {} documents, {} chunks, {} terms in {:?}",
            self.corpus_dir.display(),
            stats.documents,
            stats.chunks,
            stats.vocabulary,
            started.elapsed()
        );
        Ok(index)
    }

    fn try_retrieve(&self, query: &str) -> Result<Vec<QueryResult>> {
        let index = self.index()?;
        if index.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = index.model.transform(query)?;
        if query_vec.is_empty() {
            debug!("Query shares no terms with the vocabulary");
            return Ok(Vec::new());
        }
        let scores = index.model.similarities(&query_vec)?;
        if scores.len() != index.chunks.len() {
            return Err(Error::Operation(format!("{} scores for {} chunks", scores.len(), index.chunks.len())));
        }
        Ok(top_k(&scores, self.top_k)
            .into_iter()
            .map(|(row, score)| {
                let chunk = &index.chunks[row];
                QueryResult { source_id: chunk.source_id.clone(), excerpt: chunk.text.clone(), score }
            })
            .collect())
    }

    /// Up to `top_k` chunks ranked by similarity to `query`, best first.
    ///
    /// Never fails: any error is logged and reported as "no context".
    pub fn retrieve(&self, query: &str) -> Vec<QueryResult> {
        let span = info_span!("retrieve", query_chars = query.chars().count());
        let _entered = span.enter();
        match self.try_retrieve(query) {
            Ok(results) => {
                debug!("Returning {} results", results.len());
                results
            }
            Err(e) => {
                warn!("Retrieval failed, returning no context: {}", e);
                Vec::new()
            }
        }
    }

    pub fn retrieve_snippets(&self, query: &str) -> Vec<Snippet> {
        self.retrieve(query).into_iter().map(Snippet::from).collect()
    }
}

impl<M: VectorSpaceModel> Retriever for RetrievalEngine<M> {
    fn retrieve(&self, query: &str) -> Vec<QueryResult> {
        RetrievalEngine::retrieve(self, query)
    }
}
