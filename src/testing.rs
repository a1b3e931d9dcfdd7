//! In-memory `ActivitySource` for collector tests.

use crate::period::Window;
use crate::source::{ActivitySource, CommitNode, CommitPage, LanguageBytes, Repository};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};

pub fn repo(full_name: &str) -> Repository {
    let name = full_name.rsplit('/').next().unwrap_or(full_name).to_string();
    Repository {
        full_name: full_name.to_string(),
        name,
        url: format!("https://github.com/{full_name}"),
        description: None,
        stars: 0,
        forks: 0,
    }
}

pub fn commit(at: DateTime<Utc>, additions: u64, deletions: u64, files: u64) -> CommitNode {
    CommitNode {
        committed_at: at,
        additions: Some(additions),
        deletions: Some(deletions),
        files_changed: Some(files),
    }
}

#[derive(Default)]
pub struct FakeSource {
    pub known: Vec<Repository>,
    pub affiliated: Vec<Repository>,
    pub orgs: Vec<(String, Vec<Repository>)>,
    /// Commits per `owner/name`, all authored by `author`.
    pub commits: HashMap<String, Vec<CommitNode>>,
    pub author: String,
    pub languages: HashMap<String, LanguageBytes>,
    /// Repositories whose commit queries fail after `fail_after_pages` pages.
    pub failing_commits: HashSet<String>,
    pub fail_after_pages: usize,
    pub failing_languages: HashSet<String>,
    pub failing_orgs: HashSet<String>,
    pub affiliated_fails: bool,
    pub page_size: usize,
    pub commit_calls: Cell<usize>,
}

impl FakeSource {
    pub fn new(author: &str) -> Self {
        Self {
            author: author.to_string(),
            page_size: 2,
            ..Self::default()
        }
    }
}

impl ActivitySource for FakeSource {
    async fn repository(&self, full_name: &str) -> Result<Repository> {
        self.known
            .iter()
            .find(|r| r.full_name == full_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Repository {full_name} not found"))
    }

    async fn affiliated_repositories(&self) -> Result<Vec<Repository>> {
        if self.affiliated_fails {
            anyhow::bail!("viewer query failed");
        }
        Ok(self.affiliated.clone())
    }

    async fn organizations(&self, _login: &str) -> Result<Vec<String>> {
        Ok(self.orgs.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn organization_repositories(&self, org: &str) -> Result<Vec<Repository>> {
        if self.failing_orgs.contains(org) {
            anyhow::bail!("organization {org} is not accessible");
        }
        Ok(self
            .orgs
            .iter()
            .find(|(name, _)| name == org)
            .map(|(_, repos)| repos.clone())
            .unwrap_or_default())
    }

    async fn commit_page(
        &self,
        repo: &Repository,
        author: &str,
        window: &Window,
        cursor: Option<&str>,
    ) -> Result<CommitPage> {
        self.commit_calls.set(self.commit_calls.get() + 1);

        let page: usize = cursor.map(|c| c.parse()).transpose()?.unwrap_or(0);
        if self.failing_commits.contains(&repo.full_name) && page >= self.fail_after_pages {
            anyhow::bail!("history query failed for {}", repo.full_name);
        }
        if author != self.author {
            return Ok(CommitPage::default());
        }

        let matching: Vec<CommitNode> = self
            .commits
            .get(&repo.full_name)
            .map(|all| {
                all.iter()
                    .filter(|c| window.contains(c.committed_at))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let start = page * self.page_size;
        let end = (start + self.page_size).min(matching.len());
        let commits = matching.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next = (end < matching.len()).then(|| (page + 1).to_string());

        Ok(CommitPage { commits, next })
    }

    async fn languages(&self, repo: &Repository) -> Result<LanguageBytes> {
        if self.failing_languages.contains(&repo.full_name) {
            anyhow::bail!("languages query failed for {}", repo.full_name);
        }
        Ok(self.languages.get(&repo.full_name).cloned().unwrap_or_default())
    }
}
