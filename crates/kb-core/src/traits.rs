use crate::types::{QueryResult, Snippet, SparseVector};
use crate::Result;

/// A weighting scheme learned from a corpus of chunk texts.
///
/// `fit` is the training phase; the returned model is immutable and answers
/// queries through `FittedModel`.
pub trait VectorSpaceModel: Send + Sync {
    type Fitted: FittedModel;
    fn fit(&self, texts: &[&str]) -> Result<Self::Fitted>;
}

pub trait FittedModel: Send + Sync {
    /// Number of weight rows; row `i` belongs to the `i`-th fitted text.
    fn num_rows(&self) -> usize;
    fn vocabulary_len(&self) -> usize;
    /// Project text into the fitted space. Unknown terms are ignored.
    fn transform(&self, text: &str) -> Result<SparseVector>;
    /// Similarity of `query` against every row, in row order.
    fn similarities(&self, query: &SparseVector) -> Result<Vec<f32>>;
}

/// The single operation collaborators need: ranked context for a query.
/// Implementations never fail; "nothing relevant" is an empty vec.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, query: &str) -> Vec<QueryResult>;

    fn retrieve_snippets(&self, query: &str) -> Vec<Snippet> {
        self.retrieve(query).into_iter().map(Snippet::from).collect()
    }
}
