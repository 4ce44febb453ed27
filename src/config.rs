use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::mood::{default_categories, MoodLabelTable};
use crate::pipeline::FailurePolicy;
use crate::storage::DocumentSchema;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mood-ranker";

/// Application configuration.
///
/// Loaded from an optional TOML file, then overridden by environment
/// variables with the `MOOD_RANKER_` prefix. For example:
/// `MOOD_RANKER_RANKING__TOP_K=10`, `MOOD_RANKER_CATALOG__PATH=tracks.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ranking run configuration
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Catalog source configuration
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Emotion label mapping configuration
    #[serde(default)]
    pub labels: LabelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Leaderboard size
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Categories the reference set must cover
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Behaviour when a candidate fails to score
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            categories: default_categories(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

fn default_top_k() -> usize {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// JSON catalog file
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_name_field")]
    pub name_field: String,

    #[serde(default = "default_artist_field")]
    pub artist_field: String,

    #[serde(default = "default_vector_field")]
    pub vector_field: String,

    /// Field marking a track as a reference for a category
    #[serde(default = "default_tag_field")]
    pub tag_field: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            name_field: default_name_field(),
            artist_field: default_artist_field(),
            vector_field: default_vector_field(),
            tag_field: default_tag_field(),
        }
    }
}

fn default_name_field() -> String {
    "track_name".to_string()
}

fn default_artist_field() -> String {
    "artist_name".to_string()
}

fn default_vector_field() -> String {
    "vector".to_string()
}

fn default_tag_field() -> String {
    "standard".to_string()
}

impl CatalogConfig {
    /// Document field names for the JSON catalog reader
    pub fn schema(&self) -> DocumentSchema {
        DocumentSchema {
            name_field: self.name_field.clone(),
            artist_field: self.artist_field.clone(),
            vector_field: self.vector_field.clone(),
            tag_field: self.tag_field.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelConfig {
    /// How many top emotion labels become target categories
    #[serde(default = "default_label_limit")]
    pub limit: usize,

    /// Extra `label -> category` entries over the default table
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            limit: default_label_limit(),
            overrides: HashMap::new(),
        }
    }
}

fn default_label_limit() -> usize {
    3
}

impl LabelConfig {
    /// Default label table with the configured overrides applied
    pub fn table(&self) -> MoodLabelTable {
        MoodLabelTable::new().with_overrides(&self.overrides)
    }
}

impl AppConfig {
    /// Load configuration from `mood-ranker.toml` (if present) and the
    /// environment.
    ///
    /// Environment variables are prefixed with `MOOD_RANKER_` and use double
    /// underscores for nested values:
    /// - `MOOD_RANKER_RANKING__TOP_K` -> ranking.top_k
    /// - `MOOD_RANKER_RANKING__FAILURE_POLICY` -> ranking.failure_policy
    /// - `MOOD_RANKER_CATALOG__TAG_FIELD` -> catalog.tag_field
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name(DEFAULT_CONFIG_FILE).required(false))
    }

    /// Load configuration from an explicit file, then the environment
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("MOOD_RANKER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("ranking.categories")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.ranking.top_k, 20);
        assert_eq!(
            config.ranking.categories,
            vec!["happy", "sad", "chill", "stressing"]
        );
        assert_eq!(config.ranking.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.catalog.tag_field, "standard");
        assert_eq!(config.labels.limit, 3);
    }

    #[test]
    fn test_schema_from_catalog_config() {
        let schema = CatalogConfig::default().schema();
        assert_eq!(schema, DocumentSchema::default());
    }

    #[test]
    fn test_label_overrides() {
        let mut labels = LabelConfig::default();
        labels
            .overrides
            .insert("relief".to_string(), "chill".to_string());

        let table = labels.table();
        assert_eq!(table.lookup("relief"), Some("chill"));
        assert_eq!(table.lookup("joy"), Some("happy"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[ranking]
top_k = 5
categories = ["happy", "sad"]
failure_policy = "skip"

[catalog]
path = "tracks.json"
tag_field = "mood"

[labels.overrides]
rage = "stressing"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.ranking.top_k, 5);
        assert_eq!(config.ranking.categories, vec!["happy", "sad"]);
        assert_eq!(config.ranking.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.catalog.path, Some(PathBuf::from("tracks.json")));
        assert_eq!(config.catalog.tag_field, "mood");
        assert_eq!(config.catalog.name_field, "track_name");
        assert_eq!(
            config.labels.overrides.get("rage").map(String::as_str),
            Some("stressing")
        );
    }
}
