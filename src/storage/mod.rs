//! Catalog sources for ranking runs.
//!
//! The ranking core does not own storage. It asks a [`CatalogSource`] for the
//! whole catalog and for the items tagged as references of a category. A
//! source is opened once per run and passed explicitly; nothing here is
//! process-global.
//!
//! Implementations:
//! - [`InMemoryCatalog`] (items supplied by the caller)
//! - [`JsonFileCatalog`] (a JSON document export read once at open)

mod json_file;

pub use json_file::{DocumentSchema, JsonFileCatalog};

use std::path::PathBuf;

use crate::types::CatalogItem;

/// Error type for catalog source operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog must be a JSON array of documents")]
    NotAnArray,

    #[error("Document {index}: missing field `{field}`")]
    MissingField { index: usize, field: String },

    #[error("Document {index}: invalid vector: {reason}")]
    InvalidVector { index: usize, reason: String },

    #[error("Document {index}: vector dimensions {got:?} differ from {expected:?}")]
    SchemaMismatch {
        index: usize,
        expected: Vec<String>,
        got: Vec<String>,
    },
}

/// Read access to a track catalog
pub trait CatalogSource: Send + Sync {
    /// Every item, in catalog order
    fn fetch_all(&self) -> Result<Vec<CatalogItem>, StorageError>;

    /// Items whose reference tag equals `tag`, in catalog order
    fn fetch_tagged(&self, tag: &str) -> Result<Vec<CatalogItem>, StorageError>;

    /// Reference items for several categories, grouped per category in the
    /// order given. Repeated categories are fetched once.
    fn fetch_references(&self, categories: &[String]) -> Result<Vec<CatalogItem>, StorageError> {
        let mut items = Vec::new();
        for (i, category) in categories.iter().enumerate() {
            if categories[..i].contains(category) {
                continue;
            }
            items.extend(self.fetch_tagged(category)?);
        }
        Ok(items)
    }

    /// Number of items in the catalog
    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.fetch_all()?.len())
    }
}

/// Catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    items: Vec<CatalogItem>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}

impl CatalogSource for InMemoryCatalog {
    fn fetch_all(&self) -> Result<Vec<CatalogItem>, StorageError> {
        Ok(self.items.clone())
    }

    fn fetch_tagged(&self, tag: &str) -> Result<Vec<CatalogItem>, StorageError> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.tag.as_deref() == Some(tag))
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.items.len())
    }
}
