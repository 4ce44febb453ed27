//! Composite sort keys and the entries stored by the top-K selector.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::TrackIdentity;

/// Per-category scores in the caller's category order.
///
/// Compared lexicographically: the first score dominates, later scores only
/// break ties. When one tuple runs out of elements before a difference is
/// found the two compare equal. Scores are finite, so `-0.0` and `0.0` are
/// the only values `partial_cmp` and `total_cmp` disagree on; they compare
/// equal here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTuple(Vec<f32>);

impl ScoreTuple {
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }
}

impl From<Vec<f32>> for ScoreTuple {
    fn from(scores: Vec<f32>) -> Self {
        Self(scores)
    }
}

impl Ord for ScoreTuple {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let ord = a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ScoreTuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScoreTuple {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoreTuple {}

/// A scored candidate.
///
/// Ordered so that the better entry is the greater one: higher scores win,
/// and on equal scores the lexicographically smaller identity wins. This is a
/// total order, which makes the selector's drain sequence deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub scores: ScoreTuple,
    pub identity: TrackIdentity,
}

impl RankedEntry {
    pub fn new(scores: ScoreTuple, identity: TrackIdentity) -> Self {
        Self { scores, identity }
    }
}

impl Ord for RankedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scores
            .cmp(&other.scores)
            .then_with(|| other.identity.cmp(&self.identity))
    }
}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
