//! Shared mathematical utilities for vector operations.
//!
//! Accumulation happens in `f64` so that squaring large `f32` components cannot
//! overflow and so that summation order alone determines the result.

use crate::error::{RankError, Result};

/// Compute cosine similarity between two vectors.
///
/// # Errors
/// * [`RankError::DimensionMismatch`] if the vectors have different lengths
/// * [`RankError::DegenerateVector`] if either vector has zero magnitude
///   (an empty vector counts as zero magnitude)
/// * [`RankError::NonFiniteComponent`] if a component is NaN or infinite
///
/// # Returns
/// Cosine similarity in range [-1.0, 1.0]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RankError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }

    let dot = dot_product(a, b);
    let norm_a = squared_norm(a);
    let norm_b = squared_norm(b);

    if !(dot.is_finite() && norm_a.is_finite() && norm_b.is_finite()) {
        check_finite(a)?;
        check_finite(b)?;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(RankError::DegenerateVector);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}

/// Compute dot product of two vectors.
///
/// Callers check lengths first; extra components of the longer slice are ignored.
pub fn dot_product(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same length");
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

/// Compute L2 norm (magnitude) of a vector.
pub fn l2_norm(v: &[f32]) -> f64 {
    squared_norm(v).sqrt()
}

fn squared_norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum()
}

/// Reject NaN and infinite components, reporting the first offending index.
pub fn check_finite(v: &[f32]) -> Result<()> {
    match v.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(RankError::NonFiniteComponent { index }),
        None => Ok(()),
    }
}
