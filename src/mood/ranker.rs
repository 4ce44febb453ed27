//! Multi-category composite scoring.

use crate::error::{RankError, Result};
use crate::types::{CatalogItem, Embedding, RankedEntry, ScoreTuple};

use super::aggregate::score_for_category;
use super::reference::ReferenceSet;

/// Score a candidate against each target category, in the given order.
///
/// Categories are neither sorted nor deduplicated: their order is the
/// caller's priority order and becomes the tie-break order of the resulting
/// [`ScoreTuple`]. All categories are resolved before any scoring, so an
/// unknown category never yields a partial tuple.
pub fn rank_vector<S: AsRef<str>>(
    candidate: &Embedding,
    target_categories: &[S],
    refs: &ReferenceSet,
) -> Result<ScoreTuple> {
    MoodRanker::new(refs, target_categories)?.score(candidate)
}

/// Composite ranker with target categories resolved once per run.
#[derive(Debug, Clone)]
pub struct MoodRanker<'a> {
    targets: Vec<(&'a str, &'a [Embedding])>,
}

impl<'a> MoodRanker<'a> {
    /// # Errors
    /// [`RankError::UnknownCategory`] for the first target absent from `refs`.
    pub fn new<S: AsRef<str>>(refs: &'a ReferenceSet, target_categories: &[S]) -> Result<Self> {
        let targets = target_categories
            .iter()
            .map(|category| {
                let category = category.as_ref();
                refs.entry(category)
                    .ok_or_else(|| RankError::UnknownCategory(category.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { targets })
    }

    /// Target categories in priority order
    pub fn targets(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.targets.iter().map(|(name, _)| *name)
    }

    /// Compute the score tuple for one embedding
    pub fn score(&self, candidate: &Embedding) -> Result<ScoreTuple> {
        let scores = self
            .targets
            .iter()
            .map(|(name, refs)| score_for_category(candidate, name, refs))
            .collect::<Result<Vec<f32>>>()?;

        Ok(ScoreTuple::new(scores))
    }

    /// Score a catalog item into a selector entry
    pub fn rank(&self, item: &CatalogItem) -> Result<RankedEntry> {
        Ok(RankedEntry::new(
            self.score(&item.embedding)?,
            item.identity.clone(),
        ))
    }
}
