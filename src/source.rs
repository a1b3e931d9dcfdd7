//! The remote data the collector needs, behind a trait so collection can
//! run against the GitHub client or an in-memory fake.

use crate::period::Window;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// `owner/name`
    pub full_name: String,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
}

impl Repository {
    pub fn owner(&self) -> &str {
        self.full_name
            .split_once('/')
            .map(|(owner, _)| owner)
            .unwrap_or(&self.full_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitNode {
    pub committed_at: DateTime<Utc>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub files_changed: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct CommitPage {
    pub commits: Vec<CommitNode>,
    /// Cursor for the next page, `None` on the last page.
    pub next: Option<String>,
}

pub type LanguageBytes = BTreeMap<String, u64>;

pub trait ActivitySource {
    /// Look up a single `owner/name` repository.
    async fn repository(&self, full_name: &str) -> Result<Repository>;

    /// Repositories of the authenticated account where it is owner,
    /// collaborator or organization member.
    async fn affiliated_repositories(&self) -> Result<Vec<Repository>>;

    /// Organization logins `login` belongs to.
    async fn organizations(&self, login: &str) -> Result<Vec<String>>;

    async fn organization_repositories(&self, org: &str) -> Result<Vec<Repository>>;

    /// One page of commits by `author` inside `window`.
    async fn commit_page(
        &self,
        repo: &Repository,
        author: &str,
        window: &Window,
        cursor: Option<&str>,
    ) -> Result<CommitPage>;

    async fn languages(&self, repo: &Repository) -> Result<LanguageBytes>;
}

/// Result of a remote query whose failures are absorbed rather than raised.
///
/// `Partial` still carries a usable value: whatever was accumulated before
/// the failure (often nothing).
#[derive(Debug)]
pub enum Fetch<T> {
    Complete(T),
    Partial { value: T, error: anyhow::Error },
}

impl<T> Fetch<T> {
    pub fn value(&self) -> &T {
        match self {
            Fetch::Complete(value) | Fetch::Partial { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Fetch::Complete(value) | Fetch::Partial { value, .. } => value,
        }
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        match self {
            Fetch::Complete(_) => None,
            Fetch::Partial { error, .. } => Some(error),
        }
    }
}
