//! Per-category reference embeddings.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::{RankError, Result};
use crate::types::{CatalogItem, Embedding};

/// Reference embeddings grouped by category.
///
/// Every category holds at least one embedding, all categories share one
/// dimension, and each list keeps catalog order so that aggregation sums in a
/// reproducible order. Immutable once built; share it by reference across
/// scoring threads.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    categories: BTreeMap<String, Vec<Embedding>>,
    dimension: usize,
}

impl ReferenceSet {
    /// Reference embeddings for a category
    pub fn get(&self, category: &str) -> Option<&[Embedding]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Stored category name and its references
    pub fn entry(&self, category: &str) -> Option<(&str, &[Embedding])> {
        self.categories
            .get_key_value(category)
            .map(|(name, refs)| (name.as_str(), refs.as_slice()))
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Category names in sorted order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Reference count per category, sorted by category name
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.categories
            .iter()
            .map(|(name, refs)| (name.as_str(), refs.len()))
            .collect()
    }

    /// Shared embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Builds a [`ReferenceSet`] from tagged catalog items.
///
/// Only tags naming one of the expected categories are collected; other tags
/// are ignored. Every expected category must end up with at least one
/// reference.
#[derive(Debug, Clone)]
pub struct ReferenceSetBuilder {
    expected: Vec<String>,
}

impl ReferenceSetBuilder {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut expected: Vec<String> = Vec::new();
        for category in categories {
            let category = category.into();
            if !expected.contains(&category) {
                expected.push(category);
            }
        }
        Self { expected }
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Group tagged items by category.
    ///
    /// # Errors
    /// * [`RankError::EmptyCategory`] for the first expected category with no
    ///   tagged item
    /// * [`RankError::DimensionMismatch`] if reference embeddings disagree on
    ///   dimension (the first reference fixes it)
    pub fn build<'a, I>(&self, catalog: I) -> Result<ReferenceSet>
    where
        I: IntoIterator<Item = &'a CatalogItem>,
    {
        let mut categories: BTreeMap<String, Vec<Embedding>> = BTreeMap::new();
        let mut dimension: Option<usize> = None;

        for item in catalog {
            let Some(tag) = item.tag.as_deref() else {
                continue;
            };
            if !self.expected.iter().any(|c| c == tag) {
                debug!(tag, track = %item.identity, "Ignoring reference with unexpected tag");
                continue;
            }

            let dim = item.embedding.dim();
            match dimension {
                Some(expected) if expected != dim => {
                    return Err(RankError::DimensionMismatch { expected, got: dim });
                }
                Some(_) => {}
                None => dimension = Some(dim),
            }

            categories
                .entry(tag.to_string())
                .or_default()
                .push(item.embedding.clone());
        }

        if let Some(missing) = self.expected.iter().find(|c| !categories.contains_key(*c)) {
            return Err(RankError::EmptyCategory(missing.clone()));
        }

        let dimension = dimension.unwrap_or(0);
        info!(
            categories = categories.len(),
            references = categories.values().map(Vec::len).sum::<usize>(),
            dimension,
            "Reference set built"
        );

        Ok(ReferenceSet {
            categories,
            dimension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackIdentity;

    fn item(name: &str, values: Vec<f32>, tag: Option<&str>) -> CatalogItem {
        let item = CatalogItem::new(
            TrackIdentity::new(name, "Artist"),
            Embedding::new(values).unwrap(),
        );
        match tag {
            Some(tag) => item.with_tag(tag),
            None => item,
        }
    }

    #[test]
    fn test_groups_by_tag_in_catalog_order() {
        let catalog = vec![
            item("a", vec![1.0, 0.0], Some("happy")),
            item("b", vec![0.0, 1.0], Some("sad")),
            item("c", vec![0.5, 0.5], None),
            item("d", vec![0.2, 0.8], Some("happy")),
        ];

        let refs = ReferenceSetBuilder::new(["happy", "sad"])
            .build(&catalog)
            .unwrap();

        let happy = refs.get("happy").unwrap();
        assert_eq!(happy.len(), 2);
        assert_eq!(happy[0].as_slice(), &[1.0, 0.0]);
        assert_eq!(happy[1].as_slice(), &[0.2, 0.8]);
        assert_eq!(refs.get("sad").unwrap().len(), 1);
        assert_eq!(refs.dimension(), 2);
        assert_eq!(refs.counts(), vec![("happy", 2), ("sad", 1)]);
    }

    #[test]
    fn test_unexpected_tags_ignored() {
        let catalog = vec![
            item("a", vec![1.0, 0.0], Some("happy")),
            item("b", vec![0.0, 1.0], Some("party")),
        ];

        let refs = ReferenceSetBuilder::new(["happy"]).build(&catalog).unwrap();
        assert!(refs.contains("happy"));
        assert!(!refs.contains("party"));
    }

    #[test]
    fn test_empty_category_reported() {
        let catalog = vec![item("a", vec![1.0, 0.0], Some("happy"))];

        let result = ReferenceSetBuilder::new(["happy", "chill"]).build(&catalog);
        assert_eq!(result.unwrap_err(), RankError::EmptyCategory("chill".into()));
    }

    #[test]
    fn test_reference_dimension_mismatch() {
        let catalog = vec![
            item("a", vec![1.0, 0.0], Some("happy")),
            item("b", vec![0.0, 1.0, 0.0], Some("sad")),
        ];

        let result = ReferenceSetBuilder::new(["happy", "sad"]).build(&catalog);
        assert_eq!(
            result.unwrap_err(),
            RankError::DimensionMismatch { expected: 2, got: 3 }
        );
    }

    #[test]
    fn test_builder_deduplicates_expected() {
        let builder = ReferenceSetBuilder::new(["happy", "sad", "happy"]);
        assert_eq!(builder.expected(), &["happy".to_string(), "sad".to_string()]);
    }
}
