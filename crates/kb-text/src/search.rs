use kb_core::types::SparseVector;

/// Cosine of the angle between two sparse vectors, in [-1, 1].
/// A zero vector on either side scores 0.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
	let magnitude_a = a.norm();
	let magnitude_b = b.norm();
	if magnitude_a == 0.0 || magnitude_b == 0.0 {
		return 0.0;
	}
	a.dot(b) / (magnitude_a * magnitude_b)
}

/// The `k` best strictly positive scores as `(row, score)`, best first.
/// Equal scores keep row order, so earlier rows win ties.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
	let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().filter(|(_, s)| *s > 0.0).collect();
	ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
	ranked.truncate(k);
	ranked
}
