//! The persisted metrics snapshot: produced by `collect`, consumed by `render`.

use crate::period::PeriodTable;
use crate::source::LanguageBytes;
use crate::stats::{CommitStats, DailyBucket};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const GENERATED_BY: &str = "GitHub Metrics Dashboard";
pub const SNAPSHOT_FILE: &str = "metrics.json";
pub const TOP_REPO_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub updated_at: DateTime<Utc>,
    pub username: String,
    pub generated_by: String,
    /// Repositories with at least one failed query. Only written when
    /// incomplete-repository flagging is enabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incomplete_repos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoDetail {
    pub name: String,
    pub full_name: String,
    pub url: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub periods: PeriodTable<CommitStats>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub incomplete: bool,
}

/// Year-period figures of a top repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopRepo {
    /// `owner/name`
    pub name: String,
    pub url: String,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub meta: Meta,
    pub summary: PeriodTable<CommitStats>,
    pub repos: BTreeMap<String, RepoDetail>,
    pub daily: BTreeMap<String, DailyBucket>,
    pub languages: LanguageBytes,
    pub top_repos: Vec<TopRepo>,
}

/// Rank repositories by year-period additions, keeping the first
/// `TOP_REPO_LIMIT`. Repositories without year commits are left out; ties
/// keep the order of `details`.
pub fn rank_top_repos(details: &[RepoDetail]) -> Vec<TopRepo> {
    let mut ranked: Vec<TopRepo> = details
        .iter()
        .filter(|d| d.periods.year.commits > 0)
        .map(|d| TopRepo {
            name: d.full_name.clone(),
            url: d.url.clone(),
            commits: d.periods.year.commits,
            additions: d.periods.year.additions,
            deletions: d.periods.year.deletions,
        })
        .collect();

    ranked.sort_by(|a, b| b.additions.cmp(&a.additions));
    ranked.truncate(TOP_REPO_LIMIT);
    ranked
}

impl MetricsSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }

    /// Write the canonical snapshot plus the dated copy for the run's day.
    /// Returns both paths.
    pub fn save(&self, data_dir: &Path) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;

        let body = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;

        let current = data_dir.join(SNAPSHOT_FILE);
        let dated = data_dir.join(format!(
            "metrics-{}.json",
            self.meta.updated_at.format("%Y-%m-%d")
        ));

        for path in [&current, &dated] {
            fs::write(path, &body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        Ok((current, dated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn detail(full_name: &str, year_commits: u64, year_additions: u64) -> RepoDetail {
        let year = CommitStats {
            commits: year_commits,
            additions: year_additions,
            deletions: 1,
            files_changed: 1,
        };
        RepoDetail {
            name: full_name.rsplit('/').next().unwrap().to_string(),
            full_name: full_name.to_string(),
            url: format!("https://github.com/{full_name}"),
            description: None,
            stars: 0,
            forks: 0,
            periods: PeriodTable {
                year,
                ..PeriodTable::default()
            },
            incomplete: false,
        }
    }

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            meta: Meta {
                updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap(),
                username: "octo".to_string(),
                generated_by: GENERATED_BY.to_string(),
                incomplete_repos: Vec::new(),
            },
            summary: PeriodTable::default(),
            repos: BTreeMap::new(),
            daily: BTreeMap::new(),
            languages: LanguageBytes::new(),
            top_repos: Vec::new(),
        }
    }

    #[test]
    fn ranking_is_descending_stable_and_capped() {
        let mut details = vec![
            detail("o/quiet", 0, 0),
            detail("o/tie-first", 2, 50),
            detail("o/big", 1, 900),
            detail("o/tie-second", 3, 50),
        ];
        for i in 0..10 {
            details.push(detail(&format!("o/filler{i}"), 1, 10));
        }

        let top = rank_top_repos(&details);
        let names: Vec<&str> = top.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(top.len(), TOP_REPO_LIMIT);
        assert_eq!(&names[..3], &["o/big", "o/tie-first", "o/tie-second"]);
        assert!(!names.contains(&"o/quiet"));
        assert!(top.iter().all(|t| t.commits >= 1));
        assert!(top.windows(2).all(|w| w[0].additions >= w[1].additions));
    }

    #[test]
    fn save_writes_current_and_dated_copy() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot();

        let (current, dated) = snap.save(dir.path()).unwrap();

        assert_eq!(current, dir.path().join("metrics.json"));
        assert_eq!(dated, dir.path().join("metrics-2024-06-01.json"));
        assert_eq!(MetricsSnapshot::load(&dated).unwrap(), snap);
        assert_eq!(MetricsSnapshot::load(&current).unwrap(), snap);
    }

    #[test]
    fn flags_are_omitted_unless_set() {
        let mut snap = snapshot();
        snap.repos.insert("o/a".to_string(), detail("o/a", 1, 1));

        let json = serde_json::to_value(&snap).unwrap();
        assert!(json["meta"].get("incomplete_repos").is_none());
        assert!(json["repos"]["o/a"].get("incomplete").is_none());
        assert_eq!(json["meta"]["generated_by"], GENERATED_BY);

        snap.meta.incomplete_repos.push("o/a".to_string());
        snap.repos.get_mut("o/a").unwrap().incomplete = true;
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["meta"]["incomplete_repos"][0], "o/a");
        assert_eq!(json["repos"]["o/a"]["incomplete"], true);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MetricsSnapshot::load(&dir.path().join("metrics.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read snapshot"));
    }
}
