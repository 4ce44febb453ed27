//! Mood scoring against reference embeddings.
//!
//! Reference tracks tagged with a mood category form that category's
//! reference set. A candidate track scores against a category by its mean
//! cosine similarity to the references, and against several categories by a
//! [`ScoreTuple`](crate::types::ScoreTuple) in the caller's priority order.

pub mod aggregate;
pub mod labels;
pub mod ranker;
pub mod reference;

pub use aggregate::score_for_category;
pub use labels::{parse_predictions, MoodLabelTable, MoodQuadrant, DEFAULT_LABEL_GROUPS};
pub use ranker::{rank_vector, MoodRanker};
pub use reference::{ReferenceSet, ReferenceSetBuilder};

/// Category names of the four mood quadrants, in their conventional order
pub fn default_categories() -> Vec<String> {
    MoodQuadrant::ALL
        .iter()
        .map(|quadrant| quadrant.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories() {
        assert_eq!(
            default_categories(),
            vec!["happy", "sad", "chill", "stressing"]
        );
    }
}
