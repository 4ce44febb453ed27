//! JSON document export as a catalog source.
//!
//! The file holds an array of track documents. Field names are configurable;
//! dotted names reach into nested objects (`spotify.track_id`). A vector is
//! either an array of numbers or an object of named dimensions. Object
//! vectors are laid out by sorted dimension name, and every object vector in
//! a file must name the same dimensions as the first.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use super::{CatalogSource, InMemoryCatalog, StorageError};
use crate::types::{CatalogItem, Embedding, TrackIdentity};

/// Field names used to read track documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSchema {
    pub name_field: String,
    pub artist_field: String,
    pub vector_field: String,
    /// Field holding the reference category tag
    pub tag_field: String,
}

impl Default for DocumentSchema {
    fn default() -> Self {
        Self {
            name_field: "track_name".to_string(),
            artist_field: "artist_name".to_string(),
            vector_field: "vector".to_string(),
            tag_field: "standard".to_string(),
        }
    }
}

/// Catalog loaded from a JSON file.
///
/// The file is read and validated once in [`open`](Self::open); the handle
/// then serves queries from memory until dropped.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: Option<PathBuf>,
    inner: InMemoryCatalog,
}

impl JsonFileCatalog {
    /// Read and parse a catalog file
    pub fn open(path: impl AsRef<Path>, schema: &DocumentSchema) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut catalog = Self::from_json(&text, schema)?;
        info!(path = %path.display(), items = catalog.inner.items().len(), "Catalog loaded");
        catalog.path = Some(path.to_path_buf());
        Ok(catalog)
    }

    /// Parse a catalog from a JSON string
    pub fn from_json(json: &str, schema: &DocumentSchema) -> Result<Self, StorageError> {
        let documents = match serde_json::from_str::<Value>(json)? {
            Value::Array(documents) => documents,
            _ => return Err(StorageError::NotAnArray),
        };

        let mut parser = DocumentParser::new(schema);
        let items = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| parser.parse(index, doc))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            path: None,
            inner: InMemoryCatalog::new(items),
        })
    }

    /// Source file, if loaded from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn items(&self) -> &[CatalogItem] {
        self.inner.items()
    }
}

impl CatalogSource for JsonFileCatalog {
    fn fetch_all(&self) -> Result<Vec<CatalogItem>, StorageError> {
        self.inner.fetch_all()
    }

    fn fetch_tagged(&self, tag: &str) -> Result<Vec<CatalogItem>, StorageError> {
        self.inner.fetch_tagged(tag)
    }

    fn count(&self) -> Result<usize, StorageError> {
        self.inner.count()
    }
}

struct DocumentParser<'s> {
    schema: &'s DocumentSchema,
    // Dimension names fixed by the first object-shaped vector
    dimensions: Option<Vec<String>>,
}

impl<'s> DocumentParser<'s> {
    fn new(schema: &'s DocumentSchema) -> Self {
        Self {
            schema,
            dimensions: None,
        }
    }

    fn parse(&mut self, index: usize, doc: &Value) -> Result<CatalogItem, StorageError> {
        let name = lookup(doc, &self.schema.name_field)
            .and_then(Value::as_str)
            .ok_or_else(|| StorageError::MissingField {
                index,
                field: self.schema.name_field.clone(),
            })?;
        let artist = lookup(doc, &self.schema.artist_field)
            .and_then(Value::as_str)
            .unwrap_or_default();

        let vector = lookup(doc, &self.schema.vector_field).ok_or_else(|| {
            StorageError::MissingField {
                index,
                field: self.schema.vector_field.clone(),
            }
        })?;
        let values = self.vector_values(index, vector)?;
        let embedding = Embedding::new(values).map_err(|e| StorageError::InvalidVector {
            index,
            reason: e.to_string(),
        })?;

        let mut item = CatalogItem::new(TrackIdentity::new(name, artist), embedding);
        if let Some(tag) = lookup(doc, &self.schema.tag_field).and_then(Value::as_str) {
            item = item.with_tag(tag);
        }
        Ok(item)
    }

    fn vector_values(&mut self, index: usize, vector: &Value) -> Result<Vec<f32>, StorageError> {
        match vector {
            Value::Array(values) => values
                .iter()
                .enumerate()
                .map(|(i, v)| number(index, &i.to_string(), v))
                .collect(),
            Value::Object(map) => {
                let mut names: Vec<&String> = map.keys().collect();
                names.sort();

                match &self.dimensions {
                    Some(expected) if !expected.iter().eq(names.iter().copied()) => {
                        return Err(StorageError::SchemaMismatch {
                            index,
                            expected: expected.clone(),
                            got: names.into_iter().cloned().collect(),
                        });
                    }
                    Some(_) => {}
                    None => self.dimensions = Some(names.iter().map(|n| (*n).clone()).collect()),
                }

                names
                    .into_iter()
                    .map(|name| number(index, name, &map[name.as_str()]))
                    .collect()
            }
            _ => Err(StorageError::InvalidVector {
                index,
                reason: "expected an array or an object of numbers".to_string(),
            }),
        }
    }
}

fn number(index: usize, dimension: &str, value: &Value) -> Result<f32, StorageError> {
    value
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| StorageError::InvalidVector {
            index,
            reason: format!("dimension `{dimension}` is not a number"),
        })
}

/// Resolve a dotted field path
fn lookup<'v>(doc: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .try_fold(doc, |value, key| value.get(key))
        .filter(|value| !value.is_null())
}
