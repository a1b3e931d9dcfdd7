use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Commit activity for one (repository, window) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub files_changed: u64,
}

impl CommitStats {
    /// Count one commit. Missing line or file counts contribute zero.
    pub fn record(&mut self, additions: Option<u64>, deletions: Option<u64>, files: Option<u64>) {
        self.commits = self.commits.saturating_add(1);
        self.additions = self.additions.saturating_add(additions.unwrap_or(0));
        self.deletions = self.deletions.saturating_add(deletions.unwrap_or(0));
        self.files_changed = self.files_changed.saturating_add(files.unwrap_or(0));
    }

    pub fn net(&self) -> i64 {
        self.additions as i64 - self.deletions as i64
    }
}

impl AddAssign for CommitStats {
    fn add_assign(&mut self, rhs: Self) {
        self.commits = self.commits.saturating_add(rhs.commits);
        self.additions = self.additions.saturating_add(rhs.additions);
        self.deletions = self.deletions.saturating_add(rhs.deletions);
        self.files_changed = self.files_changed.saturating_add(rhs.files_changed);
    }
}

/// One entry of a repository's daily series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyEntry {
    pub date: String,
    pub stats: CommitStats,
}

/// Activity summed across all repositories for one calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
}

impl AddAssign<&CommitStats> for DailyBucket {
    fn add_assign(&mut self, rhs: &CommitStats) {
        self.commits = self.commits.saturating_add(rhs.commits);
        self.additions = self.additions.saturating_add(rhs.additions);
        self.deletions = self.deletions.saturating_add(rhs.deletions);
    }
}
