//! Shared types for the ranking core.
//!
//! These types describe catalog items as the ranking core sees them: an
//! identity, an embedding, and an optional reference tag. Catalog items are
//! read-only snapshots for the duration of one ranking run.

pub mod score;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RankError, Result};
use crate::math;

pub use score::{RankedEntry, ScoreTuple};

/// Fixed-dimension vector placing an item in a shared semantic space.
///
/// Construction rejects NaN and infinite components so every similarity
/// computed from it is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Create an embedding, validating that every component is finite
    pub fn new(values: Vec<f32>) -> Result<Self> {
        math::check_finite(&values)?;
        Ok(Self(values))
    }

    /// Number of dimensions
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        math::l2_norm(&self.0)
    }

    /// Cosine similarity against another embedding of the same dimension
    pub fn similarity(&self, other: &Embedding) -> Result<f32> {
        math::cosine_similarity(&self.0, &other.0)
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = RankError;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.0
    }
}

/// Display identity of a track.
///
/// Not guaranteed unique across a catalog. Ordering compares `track_name`
/// first and `artist_name` second, which is how ties between equal score
/// tuples are broken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackIdentity {
    pub track_name: String,
    pub artist_name: String,
}

impl TrackIdentity {
    pub fn new(track_name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            track_name: track_name.into(),
            artist_name: artist_name.into(),
        }
    }

    /// Composite display key, e.g. `"Beggin' by Madcon"`
    pub fn display_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TrackIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.artist_name.is_empty() {
            write!(f, "{}", self.track_name)
        } else {
            write!(f, "{} by {}", self.track_name, self.artist_name)
        }
    }
}

/// A catalog entry as consumed by the ranking core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub identity: TrackIdentity,
    pub embedding: Embedding,
    /// Category this item is a canonical reference for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl CatalogItem {
    pub fn new(identity: TrackIdentity, embedding: Embedding) -> Self {
        Self {
            identity,
            embedding,
            tag: None,
        }
    }

    /// Builder method to mark this item as a reference for a category
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}
