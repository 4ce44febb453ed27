//! Leaderboard rendering for the command line.

use std::fmt::Write as _;

use serde::Serialize;

use crate::pipeline::RankReport;

/// One category score in rendered output
#[derive(Debug, Clone, Serialize)]
pub struct CategoryScore<'a> {
    pub category: &'a str,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry<'a> {
    pub rank: usize,
    pub track_name: &'a str,
    pub artist_name: &'a str,
    pub scores: Vec<CategoryScore<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedView<'a> {
    pub track_name: &'a str,
    pub artist_name: &'a str,
    pub code: &'static str,
    pub message: String,
}

/// Serializable view of a [`RankReport`]
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard<'a> {
    pub categories: &'a [String],
    pub scored: usize,
    pub entries: Vec<LeaderboardEntry<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedView<'a>>,
}

impl<'a> From<&'a RankReport> for Leaderboard<'a> {
    fn from(report: &'a RankReport) -> Self {
        let entries = report
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardEntry {
                rank: i + 1,
                track_name: &entry.identity.track_name,
                artist_name: &entry.identity.artist_name,
                scores: report
                    .categories
                    .iter()
                    .zip(entry.scores.as_slice())
                    .map(|(category, &score)| CategoryScore { category, score })
                    .collect(),
            })
            .collect();

        let skipped = report
            .skipped
            .iter()
            .map(|s| SkippedView {
                track_name: &s.identity.track_name,
                artist_name: &s.identity.artist_name,
                code: s.error.code(),
                message: s.error.to_string(),
            })
            .collect();

        Self {
            categories: &report.categories,
            scored: report.scored,
            entries,
            skipped,
        }
    }
}

/// Render as pretty-printed JSON
pub fn render_json(report: &RankReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Leaderboard::from(report))
}

/// Render as a numbered plain-text leaderboard
pub fn render_text(report: &RankReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Top {} by {} ({} scored, {} skipped)",
        report.entries.len(),
        report.categories.join(" > "),
        report.scored,
        report.skipped.len()
    );

    let width = report.entries.len().to_string().len();
    for (i, entry) in report.entries.iter().enumerate() {
        let _ = write!(out, "{:>width$}. {}", i + 1, entry.identity);
        for (category, score) in report.categories.iter().zip(entry.scores.as_slice()) {
            let _ = write!(out, "  {category}={score:.4}");
        }
        out.push('\n');
    }

    for skipped in &report.skipped {
        let _ = writeln!(
            out,
            "skipped: {} [{}] {}",
            skipped.identity,
            skipped.error.code(),
            skipped.error
        );
    }

    out
}
