//! Mood Ranker
//!
//! Ranks a catalog of songs against mood reference embeddings. Each song gets
//! one mean-cosine score per requested mood category, the scores form a
//! lexicographic sort key in the caller's category order, and a bounded
//! top-K selector keeps the best N songs without sorting the catalog.

pub mod config;
pub mod error;
pub mod math;
pub mod mood;
pub mod pipeline;
pub mod report;
pub mod storage;
pub mod topk;
pub mod types;

pub use config::AppConfig;
pub use error::{RankError, Result};

pub use mood::{rank_vector, score_for_category, MoodRanker, ReferenceSet, ReferenceSetBuilder};
pub use pipeline::{rank_catalog, FailurePolicy, RankReport, RankingRun};
pub use topk::TopK;
pub use types::{CatalogItem, Embedding, RankedEntry, ScoreTuple, TrackIdentity};
