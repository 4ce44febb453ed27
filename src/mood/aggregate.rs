//! Single-category scoring.

use crate::error::{RankError, Result};
use crate::types::Embedding;

/// Mean cosine similarity of `candidate` against every reference of one
/// category.
///
/// The mean scores how typical the candidate is of the category as a whole,
/// so one outlying reference cannot dominate. Similarities are summed in
/// `refs` order, which keeps results bit-identical across runs with the same
/// inputs.
///
/// # Errors
/// * [`RankError::EmptyCategory`] if `refs` is empty
/// * any error from the similarity metric
pub fn score_for_category(candidate: &Embedding, category: &str, refs: &[Embedding]) -> Result<f32> {
    if refs.is_empty() {
        return Err(RankError::EmptyCategory(category.to_string()));
    }

    let mut sum = 0.0f64;
    for reference in refs {
        sum += f64::from(candidate.similarity(reference)?);
    }

    Ok((sum / refs.len() as f64) as f32)
}
