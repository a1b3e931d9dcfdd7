//! Collection phase: resolve repositories, accumulate commit statistics per
//! period and per day, merge language bytes, and assemble the snapshot.
//!
//! Remote failures never escape this module. Each query reports a
//! [`Fetch`], the value is always used and the error is logged (and, when
//! configured, recorded in the snapshot).

use crate::period::{Period, PeriodTable, Window, trailing_days};
use crate::snapshot::{GENERATED_BY, Meta, MetricsSnapshot, RepoDetail, rank_top_repos};
use crate::source::{ActivitySource, Fetch, LanguageBytes, Repository};
use crate::stats::{CommitStats, DailyBucket, DailyEntry};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Trailing window of the per-repository daily series.
pub const DAILY_WINDOW_DAYS: u32 = 90;

pub struct CollectOptions<'a> {
    pub username: &'a str,
    pub repos_to_track: &'a [String],
    pub flag_incomplete: bool,
}

/// Resolve the working set of repositories.
///
/// An explicit allowlist is looked up entry by entry; otherwise every
/// repository affiliated with the authenticated account is taken, followed
/// by the repositories of each organization `username` belongs to. Lookup
/// failures are logged and skipped. The first occurrence of a full name wins.
pub async fn enumerate_repositories<S: ActivitySource>(
    source: &S,
    username: &str,
    repos_to_track: &[String],
) -> Vec<Repository> {
    let mut repos = Vec::new();
    let mut seen = HashSet::new();

    let mut push = |repo: Repository, repos: &mut Vec<Repository>| {
        if seen.insert(repo.full_name.clone()) {
            debug!(repo = %repo.full_name, "found repository");
            repos.push(repo);
        }
    };

    if !repos_to_track.is_empty() {
        for full_name in repos_to_track {
            match source.repository(full_name).await {
                Ok(repo) => push(repo, &mut repos),
                Err(e) => warn!("Could not access {full_name}: {e:#}"),
            }
        }
        return repos;
    }

    match source.affiliated_repositories().await {
        Ok(found) => found.into_iter().for_each(|r| push(r, &mut repos)),
        Err(e) => warn!("Could not fetch user repos: {e:#}"),
    }

    match source.organizations(username).await {
        Ok(orgs) => {
            for org in orgs {
                match source.organization_repositories(&org).await {
                    Ok(found) => found.into_iter().for_each(|r| push(r, &mut repos)),
                    Err(e) => warn!("Could not fetch repos of organization {org}: {e:#}"),
                }
            }
        }
        Err(e) => warn!("Could not fetch organizations of {username}: {e:#}"),
    }

    repos
}

/// Count `author`'s commits in `window` and sum their line and file counts.
///
/// Pages are accumulated until the history ends or a query fails; on failure
/// the stats gathered so far are returned as `Fetch::Partial`.
pub async fn commit_stats<S: ActivitySource>(
    source: &S,
    repo: &Repository,
    author: &str,
    window: &Window,
) -> Fetch<CommitStats> {
    let mut stats = CommitStats::default();
    let mut cursor: Option<String> = None;

    loop {
        let page = match source
            .commit_page(repo, author, window, cursor.as_deref())
            .await
        {
            Ok(page) => page,
            Err(error) => return Fetch::Partial { value: stats, error },
        };

        for commit in page.commits {
            if window.contains(commit.committed_at) {
                stats.record(commit.additions, commit.deletions, commit.files_changed);
            }
        }

        match page.next {
            Some(next) => cursor = Some(next),
            None => return Fetch::Complete(stats),
        }
    }
}

/// Per-day stats over the trailing `days`, oldest first, ending with the
/// day of `now`.
pub async fn daily_series<S: ActivitySource>(
    source: &S,
    repo: &Repository,
    author: &str,
    now: DateTime<Utc>,
    days: u32,
) -> Fetch<Vec<DailyEntry>> {
    let mut series = Vec::with_capacity(days as usize + 1);
    let mut first_error = None;

    for day in trailing_days(now, days) {
        let fetched = commit_stats(source, repo, author, &day.window).await;
        let stats = match fetched {
            Fetch::Complete(stats) => stats,
            Fetch::Partial { value, error } => {
                first_error.get_or_insert(error);
                value
            }
        };
        series.push(DailyEntry {
            date: day.key(),
            stats,
        });
    }

    match first_error {
        None => Fetch::Complete(series),
        Some(error) => Fetch::Partial {
            value: series,
            error,
        },
    }
}

/// Language byte counts of `repo`; empty when the query fails.
pub async fn language_bytes<S: ActivitySource>(
    source: &S,
    repo: &Repository,
) -> Fetch<LanguageBytes> {
    match source.languages(repo).await {
        Ok(langs) => Fetch::Complete(langs),
        Err(error) => Fetch::Partial {
            value: LanguageBytes::new(),
            error,
        },
    }
}

/// Accumulators for one run. Built fresh by [`collect`] and folded into the
/// snapshot at the end.
#[derive(Debug, Default)]
struct Aggregate {
    summary: PeriodTable<CommitStats>,
    details: Vec<RepoDetail>,
    daily: BTreeMap<String, DailyBucket>,
    languages: LanguageBytes,
    incomplete: Vec<String>,
}

impl Aggregate {
    fn add_daily(&mut self, series: &[DailyEntry]) {
        for entry in series {
            *self.daily.entry(entry.date.clone()).or_default() += &entry.stats;
        }
    }

    fn add_languages(&mut self, langs: LanguageBytes) {
        for (lang, bytes) in langs {
            let total = self.languages.entry(lang).or_insert(0);
            *total = total.saturating_add(bytes);
        }
    }
}

fn note_failure<T>(fetched: &Fetch<T>, repo: &Repository, what: &str, failed: &mut bool) {
    if let Some(e) = fetched.error() {
        warn!(repo = %repo.full_name, "{what} query failed: {e:#}");
        *failed = true;
    }
}

/// Run the whole collection phase against `source` at the instant `now`.
pub async fn collect<S: ActivitySource>(
    source: &S,
    options: &CollectOptions<'_>,
    now: DateTime<Utc>,
) -> MetricsSnapshot {
    let author = options.username;
    let windows: Vec<(Period, Window)> = Period::ALL
        .into_iter()
        .map(|p| (p, p.window(now)))
        .collect();

    let repos = enumerate_repositories(source, author, options.repos_to_track).await;
    info!("Tracking {} repositories...", repos.len());

    let mut agg = Aggregate::default();

    for repo in repos {
        info!("Processing: {}", repo.full_name);

        let mut failed = false;
        let mut periods = PeriodTable::<CommitStats>::default();

        for (period, window) in &windows {
            let fetched = commit_stats(source, &repo, author, window).await;
            note_failure(&fetched, &repo, period.key(), &mut failed);
            let stats = fetched.into_value();

            *agg.summary.get_mut(*period) += stats;
            *periods.get_mut(*period) = stats;
        }

        let active = periods.iter().any(|(_, s)| s.commits > 0);

        if active {
            let fetched = daily_series(source, &repo, author, now, DAILY_WINDOW_DAYS).await;
            note_failure(&fetched, &repo, "daily", &mut failed);
            agg.add_daily(fetched.value());
        }

        let fetched = language_bytes(source, &repo).await;
        note_failure(&fetched, &repo, "languages", &mut failed);
        agg.add_languages(fetched.into_value());

        let flagged = failed && options.flag_incomplete;
        if flagged {
            agg.incomplete.push(repo.full_name.clone());
        }

        if active {
            agg.details.push(RepoDetail {
                name: repo.name,
                full_name: repo.full_name,
                url: repo.url,
                description: repo.description,
                stars: repo.stars,
                forks: repo.forks,
                periods,
                incomplete: flagged,
            });
        }
    }

    let top_repos = rank_top_repos(&agg.details);

    MetricsSnapshot {
        meta: Meta {
            updated_at: now,
            username: author.to_string(),
            generated_by: GENERATED_BY.to_string(),
            incomplete_repos: agg.incomplete,
        },
        summary: agg.summary,
        repos: agg
            .details
            .into_iter()
            .map(|d| (d.full_name.clone(), d))
            .collect(),
        daily: agg.daily,
        languages: agg.languages,
        top_repos,
    }
}
