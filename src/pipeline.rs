//! One ranking run: catalog in, drained leaderboard out.
//!
//! Items stream one at a time through the [`MoodRanker`] into a [`TopK`]
//! selector, which is drained once at the end. With the `parallel` feature the
//! catalog can instead be split across threads, each partition filling its
//! own selector; merging the partial selectors gives the same leaderboard as
//! the sequential run.

use std::num::NonZeroUsize;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RankError, Result};
use crate::mood::{MoodRanker, ReferenceSet};
use crate::topk::TopK;
use crate::types::{CatalogItem, RankedEntry, TrackIdentity};

/// What to do when a single candidate fails to score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run and return the candidate's error
    #[default]
    Abort,
    /// Record the failure in the report and continue
    Skip,
}

/// A candidate left out of the leaderboard because it failed to score
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub identity: TrackIdentity,
    pub error: RankError,
}

/// Outcome of a ranking run
#[derive(Debug, Clone)]
pub struct RankReport {
    /// Target categories in priority order (the score tuple layout)
    pub categories: Vec<String>,
    /// Best entries, best first
    pub entries: Vec<RankedEntry>,
    /// Number of candidates scored successfully
    pub scored: usize,
    /// Candidates that failed under [`FailurePolicy::Skip`], in catalog order
    pub skipped: Vec<SkippedItem>,
}

/// A configured ranking run over one reference set.
#[derive(Debug, Clone)]
pub struct RankingRun<'a> {
    ranker: MoodRanker<'a>,
    capacity: NonZeroUsize,
    policy: FailurePolicy,
}

impl<'a> RankingRun<'a> {
    /// Validate the run before any candidate is touched.
    ///
    /// # Errors
    /// * [`RankError::InvalidCapacity`] if `capacity` is 0
    /// * [`RankError::UnknownCategory`] if a target has no reference set
    pub fn new<S: AsRef<str>>(
        references: &'a ReferenceSet,
        target_categories: &[S],
        capacity: usize,
    ) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(RankError::InvalidCapacity(capacity))?;
        let ranker = MoodRanker::new(references, target_categories)?;

        Ok(Self {
            ranker,
            capacity,
            policy: FailurePolicy::default(),
        })
    }

    /// Builder method to set the failure policy
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Score every item and return the best `capacity` of them.
    ///
    /// # Errors
    /// Under [`FailurePolicy::Abort`], the first candidate error in catalog
    /// order.
    pub fn run<'i, I>(&self, items: I) -> Result<RankReport>
    where
        I: IntoIterator<Item = &'i CatalogItem>,
    {
        let started = Instant::now();
        let mut acc = Accumulator::new(self.capacity);
        for item in items {
            acc.ingest(&self.ranker, item, self.policy)?;
        }
        Ok(self.finish(acc, started))
    }

    /// Partitioned variant of [`run`](Self::run).
    ///
    /// The leaderboard and the skipped list are identical to the sequential
    /// run. Under [`FailurePolicy::Abort`] the returned error may come from
    /// any failing candidate, not necessarily the first in catalog order.
    #[cfg(feature = "parallel")]
    pub fn run_parallel(&self, items: &[CatalogItem]) -> Result<RankReport> {
        use rayon::prelude::*;

        let started = Instant::now();
        let acc = items
            .par_iter()
            .try_fold(
                || Accumulator::new(self.capacity),
                |mut acc, item| {
                    acc.ingest(&self.ranker, item, self.policy)?;
                    Ok(acc)
                },
            )
            .try_reduce(
                || Accumulator::new(self.capacity),
                |left, right| Ok(left.merge(right)),
            )?;
        Ok(self.finish(acc, started))
    }

    fn finish(&self, acc: Accumulator, started: Instant) -> RankReport {
        let entries = acc.top.drain_sorted();
        info!(
            scored = acc.scored,
            skipped = acc.skipped.len(),
            kept = entries.len(),
            capacity = self.capacity.get(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ranking run complete"
        );

        RankReport {
            categories: self.ranker.targets().map(str::to_string).collect(),
            entries,
            scored: acc.scored,
            skipped: acc.skipped,
        }
    }
}

/// Rank a catalog with the default (abort) policy and return the drained
/// leaderboard.
pub fn rank_catalog<'i, I, S>(
    items: I,
    references: &ReferenceSet,
    target_categories: &[S],
    capacity: usize,
) -> Result<Vec<RankedEntry>>
where
    I: IntoIterator<Item = &'i CatalogItem>,
    S: AsRef<str>,
{
    Ok(RankingRun::new(references, target_categories, capacity)?
        .run(items)?
        .entries)
}

/// Per-partition state: one selector plus bookkeeping
struct Accumulator {
    top: TopK,
    scored: usize,
    skipped: Vec<SkippedItem>,
}

impl Accumulator {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            top: TopK::with_capacity(capacity),
            scored: 0,
            skipped: Vec::new(),
        }
    }

    fn ingest(&mut self, ranker: &MoodRanker<'_>, item: &CatalogItem, policy: FailurePolicy) -> Result<()> {
        match ranker.rank(item) {
            Ok(entry) => {
                self.scored += 1;
                self.top.insert(entry);
                Ok(())
            }
            Err(error) => {
                warn!(track = %item.identity, code = error.code(), %error, "Candidate failed to score");
                match policy {
                    FailurePolicy::Abort => Err(error),
                    FailurePolicy::Skip => {
                        self.skipped.push(SkippedItem {
                            identity: item.identity.clone(),
                            error,
                        });
                        Ok(())
                    }
                }
            }
        }
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    fn merge(mut self, other: Accumulator) -> Self {
        self.top.merge(other.top);
        self.scored += other.scored;
        self.skipped.extend(other.skipped);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::ReferenceSetBuilder;
    use crate::types::Embedding;

    fn item(name: &str, values: &[f32]) -> CatalogItem {
        CatalogItem::new(
            TrackIdentity::new(name, ""),
            Embedding::new(values.to_vec()).unwrap(),
        )
    }

    fn scenario() -> (Vec<CatalogItem>, ReferenceSet) {
        let catalog = vec![
            item("A", &[1.0, 0.0]),
            item("B", &[0.0, 1.0]),
            item("C", &[1.0, 1.0]),
            item("D", &[-1.0, 0.0]),
            item("E", &[0.5, 0.5]),
        ];
        let references = vec![item("ref", &[1.0, 0.0]).with_tag("happy")];
        let refs = ReferenceSetBuilder::new(["happy"]).build(&references).unwrap();
        (catalog, refs)
    }

    fn names(entries: &[RankedEntry]) -> Vec<&str> {
        entries
            .iter()
            .map(|e| e.identity.track_name.as_str())
            .collect()
    }

    #[test]
    fn test_five_item_scenario() {
        let (catalog, refs) = scenario();

        let entries = rank_catalog(&catalog, &refs, &["happy"], 3).unwrap();
        assert_eq!(names(&entries), vec!["A", "C", "E"]);
        assert!((entries[0].scores.get(0).unwrap() - 1.0).abs() < 1e-6);
        assert!((entries[1].scores.get(0).unwrap() - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert_eq!(entries[1].scores, entries[2].scores);
    }

    #[test]
    fn test_zero_capacity() {
        let (_, refs) = scenario();
        assert!(matches!(
            RankingRun::new(&refs, &["happy"], 0),
            Err(RankError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn test_unknown_category_rejected_up_front() {
        let (_, refs) = scenario();
        assert_eq!(
            RankingRun::new(&refs, &["happy", "angry"], 3).unwrap_err(),
            RankError::UnknownCategory("angry".into())
        );
    }

    #[test]
    fn test_abort_policy_propagates() {
        let (mut catalog, refs) = scenario();
        catalog.insert(2, item("Z", &[0.0, 0.0]));

        let run = RankingRun::new(&refs, &["happy"], 3).unwrap();
        assert_eq!(run.run(&catalog).unwrap_err(), RankError::DegenerateVector);
    }

    #[test]
    fn test_skip_policy_records_failures() {
        let (mut catalog, refs) = scenario();
        catalog.insert(2, item("Z", &[0.0, 0.0]));
        catalog.push(item("W", &[1.0, 0.0, 0.0]));

        let report = RankingRun::new(&refs, &["happy"], 3)
            .unwrap()
            .with_policy(FailurePolicy::Skip)
            .run(&catalog)
            .unwrap();

        assert_eq!(report.scored, 5);
        assert_eq!(report.categories, vec!["happy"]);
        assert_eq!(names(&report.entries), vec!["A", "C", "E"]);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].identity.track_name, "Z");
        assert_eq!(report.skipped[0].error, RankError::DegenerateVector);
        assert_eq!(
            report.skipped[1].error,
            RankError::DimensionMismatch { expected: 3, got: 2 }
        );
    }

    #[test]
    fn test_capacity_larger_than_catalog() {
        let (catalog, refs) = scenario();
        let entries = rank_catalog(&catalog, &refs, &["happy"], 50).unwrap();
        assert_eq!(names(&entries), vec!["A", "C", "E", "B", "D"]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let (catalog, refs) = scenario();
        let run = RankingRun::new(&refs, &["happy"], 3).unwrap();

        let sequential = run.run(&catalog).unwrap();
        let parallel = run.run_parallel(&catalog).unwrap();
        assert_eq!(sequential.entries, parallel.entries);
        assert_eq!(sequential.scored, parallel.scored);
    }
}
