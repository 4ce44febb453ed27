//! Bounded top-K selection over ranked entries.
//!
//! [`TopK`] keeps at most `K` entries in a min-oriented binary heap. The root
//! is always the worst entry held, so a new candidate only has to beat the
//! root to get in. Memory stays at `K` entries and the full candidate stream
//! is never sorted.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::num::NonZeroUsize;

use crate::error::{RankError, Result};
use crate::types::RankedEntry;

/// Size-capped selector keeping the `K` best [`RankedEntry`] values.
///
/// "Best" follows [`RankedEntry`]'s ordering: score tuples compared
/// lexicographically, identity as the final tie-break.
#[derive(Debug, Clone)]
pub struct TopK {
    capacity: NonZeroUsize,
    // `BinaryHeap` is max-oriented; `Reverse` turns it into a min-heap.
    heap: BinaryHeap<Reverse<RankedEntry>>,
}

impl TopK {
    /// Create an empty selector holding at most `capacity` entries.
    ///
    /// # Errors
    /// [`RankError::InvalidCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or(RankError::InvalidCapacity(capacity))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.get()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The entry that would be evicted next
    pub fn peek_min(&self) -> Option<&RankedEntry> {
        self.heap.peek().map(|Reverse(entry)| entry)
    }

    /// Offer an entry. Returns `true` if it was kept.
    ///
    /// Below capacity the entry is always kept. At capacity it replaces the
    /// current minimum only if it is strictly greater; otherwise it is
    /// discarded and the selector is unchanged.
    pub fn insert(&mut self, entry: RankedEntry) -> bool {
        if self.heap.len() < self.capacity.get() {
            self.heap.push(Reverse(entry));
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut min) if entry > min.0 => {
                // Replacing through PeekMut re-sifts on drop: one O(log K) pass.
                *min = Reverse(entry);
                true
            }
            _ => false,
        }
    }

    /// Fold another selector's entries into this one.
    ///
    /// The result holds the best `capacity` entries of the union, exactly as
    /// if every entry had been inserted into `self` directly.
    pub fn merge(&mut self, other: TopK) {
        for Reverse(entry) in other.heap {
            self.insert(entry);
        }
    }

    /// Consume the selector, returning its entries best first.
    pub fn drain_sorted(self) -> Vec<RankedEntry> {
        // Ascending order of `Reverse<T>` is descending order of `T`.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| entry)
            .collect()
    }
}
