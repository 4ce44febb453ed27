//! Emotion label to mood quadrant mapping.
//!
//! An upstream text classifier emits raw emotion labels ("joy", "grief", ...)
//! with scores. This table folds them into the four coarse mood quadrants the
//! reference catalog is tagged with. It belongs to the calling layer: the
//! ranking core only ever sees the resulting ordered category list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coarse mood quadrant used to tag reference tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodQuadrant {
    Happy,
    Sad,
    Chill,
    Stressing,
}

impl MoodQuadrant {
    pub const ALL: [MoodQuadrant; 4] = [
        MoodQuadrant::Happy,
        MoodQuadrant::Sad,
        MoodQuadrant::Chill,
        MoodQuadrant::Stressing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodQuadrant::Happy => "happy",
            MoodQuadrant::Sad => "sad",
            MoodQuadrant::Chill => "chill",
            MoodQuadrant::Stressing => "stressing",
        }
    }
}

impl std::fmt::Display for MoodQuadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw labels grouped under one quadrant
#[derive(Debug, Clone)]
pub struct QuadrantLabels {
    pub quadrant: MoodQuadrant,
    pub labels: &'static [&'static str],
}

pub const HAPPY_LABELS: QuadrantLabels = QuadrantLabels {
    quadrant: MoodQuadrant::Happy,
    labels: &[
        "joy",
        "amusement",
        "surprise",
        "love",
        "excitement",
        "gratitude",
        "pride",
        "relief",
    ],
};

pub const SAD_LABELS: QuadrantLabels = QuadrantLabels {
    quadrant: MoodQuadrant::Sad,
    labels: &[
        "sadness",
        "disappointment",
        "grief",
        "remorse",
        "embarrassment",
    ],
};

// "relief" also appears here; the happy group is consulted first and wins.
pub const CHILL_LABELS: QuadrantLabels = QuadrantLabels {
    quadrant: MoodQuadrant::Chill,
    labels: &[
        "neutral",
        "curiosity",
        "approval",
        "admiration",
        "realization",
        "optimism",
        "desire",
        "relief",
    ],
};

pub const STRESSING_LABELS: QuadrantLabels = QuadrantLabels {
    quadrant: MoodQuadrant::Stressing,
    labels: &[
        "anger",
        "annoyance",
        "disapproval",
        "disgust",
        "fear",
        "confusion",
        "caring",
        "nervousness",
    ],
};

/// Groups in lookup priority order
pub const DEFAULT_LABEL_GROUPS: &[QuadrantLabels] =
    &[HAPPY_LABELS, SAD_LABELS, CHILL_LABELS, STRESSING_LABELS];

/// Label to category lookup table.
///
/// Labels are matched case-insensitively. Categories are plain strings so
/// overrides can point at categories beyond the four quadrants.
#[derive(Debug, Clone)]
pub struct MoodLabelTable {
    entries: HashMap<String, String>,
}

impl Default for MoodLabelTable {
    fn default() -> Self {
        let mut entries = HashMap::new();
        for group in DEFAULT_LABEL_GROUPS {
            for label in group.labels {
                entries
                    .entry((*label).to_string())
                    .or_insert_with(|| group.quadrant.as_str().to_string());
            }
        }
        Self { entries }
    }
}

impl MoodLabelTable {
    /// Create a table with the default label groups
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Layer `label -> category` overrides on top of the current entries
    pub fn with_overrides<I, L, C>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (L, C)>,
        L: AsRef<str>,
        C: Into<String>,
    {
        for (label, category) in overrides {
            self.entries
                .insert(label.as_ref().to_lowercase(), category.into());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Category for a raw label, if mapped
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.entries.get(&label.to_lowercase()).map(String::as_str)
    }

    /// Turn classifier predictions into an ordered target category list.
    ///
    /// Predictions are ranked by descending score (ties by label), the first
    /// `limit` are mapped, and unmapped labels are dropped. Duplicates are
    /// kept: two happy labels in the top three put "happy" at two priority
    /// positions.
    pub fn categories_for(&self, predictions: &[(String, f32)], limit: usize) -> Vec<String> {
        let mut ranked: Vec<&(String, f32)> = predictions.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .take(limit)
            .filter_map(|(label, score)| match self.lookup(label) {
                Some(category) => Some(category.to_string()),
                None => {
                    debug!(label = %label, score, "Dropping unmapped emotion label");
                    None
                }
            })
            .collect()
    }
}

/// Parse a classifier output document of the form `{"joy": 0.91, ...}`.
pub fn parse_predictions(json: &str) -> serde_json::Result<Vec<(String, f32)>> {
    let map: HashMap<String, f32> = serde_json::from_str(json)?;
    Ok(map.into_iter().collect())
}
