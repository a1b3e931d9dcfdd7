use crate::config::Config;
use crate::period::Window;
use crate::source::{ActivitySource, CommitNode, CommitPage, LanguageBytes, Repository};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

const PAGE_SIZE: u32 = 100;

const REPO_FIELDS: &str = r#"
fragment RepoFields on Repository {
    nameWithOwner
    name
    url
    description
    stargazerCount
    forkCount
}
"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

/// A page of a GraphQL connection, read from either `nodes` or `edges`.
#[derive(Deserialize)]
struct Connection<T> {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    nodes: Option<Vec<Option<T>>>,
    edges: Option<Vec<Option<T>>>,
}

impl<T> Connection<T> {
    fn items(self) -> impl Iterator<Item = T> {
        self.nodes
            .into_iter()
            .chain(self.edges)
            .flatten()
            .flatten()
    }

    fn next_cursor(&self) -> Option<String> {
        if self.page_info.has_next_page {
            self.page_info.end_cursor.clone()
        } else {
            None
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryNode {
    committed_date: DateTime<Utc>,
    additions: Option<u64>,
    deletions: Option<u64>,
    changed_files_if_available: Option<u64>,
}

#[derive(Deserialize)]
struct LanguageEdge {
    size: u64,
    node: LanguageName,
}

#[derive(Deserialize)]
struct LanguageName {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoNode {
    name_with_owner: String,
    name: String,
    url: String,
    description: Option<String>,
    stargazer_count: u64,
    fork_count: u64,
}

impl From<RepoNode> for Repository {
    fn from(node: RepoNode) -> Self {
        Repository {
            full_name: node.name_with_owner,
            name: node.name,
            url: node.url,
            description: node.description,
            stars: node.stargazer_count,
            forks: node.fork_count,
        }
    }
}

pub struct GithubClient {
    token: String,
    http: Client,
    endpoint: String,
    author_ids: Mutex<HashMap<String, String>>,
}

impl GithubClient {
    /// Create a GitHub GraphQL client from the loaded configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            token: config.token.clone(),
            http: Client::new(),
            endpoint: config.api_url.clone(),
            author_ids: Mutex::new(HashMap::new()),
        }
    }

    /// Low-level GraphQL request with `errors` checking. No retries.
    async fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        let resp = self
            .http
            .post(self.endpoint.as_str())
            .bearer_auth(&self.token)
            .header("User-Agent", "commit-pulse")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Network error sending GraphQL request: {e}"))?;

        let status = resp.status();

        // Parse JSON (even for non-2xx to capture error payloads)
        let json: Value = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON from GitHub: {e}"))?;

        if let Some(errors) = json.get("errors") {
            return Err(anyhow::anyhow!("GraphQL reported errors: {errors:#}"));
        }

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "GitHub API returned HTTP {}: {json:#}",
                status.as_u16()
            ));
        }

        Ok(json)
    }

    /// Walk a cursor-paginated connection found at `pointer` in the response.
    async fn connection<T: DeserializeOwned>(
        &self,
        query: &str,
        mut variables: Value,
        pointer: &str,
    ) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            variables["after"] = json!(cursor);
            let json = self.graphql(query, variables.clone()).await?;

            let node = json
                .pointer(pointer)
                .filter(|v| !v.is_null())
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Response has no data at {pointer}"))?;
            let page: Connection<T> = serde_json::from_value(node)
                .with_context(|| format!("Failed to deserialize connection at {pointer}"))?;

            cursor = page.next_cursor();
            out.extend(page.items());
            debug!(pointer, total = out.len(), "fetched page");

            if cursor.is_none() {
                break;
            }
        }

        Ok(out)
    }

    /// Node id of `login`, resolved once and cached.
    async fn author_id(&self, login: &str) -> Result<String> {
        let mut ids = self.author_ids.lock().await;
        if let Some(id) = ids.get(login) {
            return Ok(id.clone());
        }

        let query = r#"
            query($login: String!) {
                user(login: $login) {
                    id
                }
            }
        "#;
        let json = self.graphql(query, json!({ "login": login })).await?;
        let id = json
            .pointer("/data/user/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("User {login} not found"))?;

        ids.insert(login.to_string(), id.clone());
        Ok(id)
    }
}

fn split_full_name(full_name: &str) -> Result<(&str, &str)> {
    full_name
        .split_once('/')
        .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Expected owner/name, got {full_name:?}"))
}

fn git_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl ActivitySource for GithubClient {
    async fn repository(&self, full_name: &str) -> Result<Repository> {
        let (owner, name) = split_full_name(full_name)?;
        let query = format!(
            r#"
            query($owner: String!, $name: String!) {{
                repository(owner: $owner, name: $name) {{
                    ...RepoFields
                }}
            }}
            {REPO_FIELDS}
            "#
        );

        let json = self
            .graphql(&query, json!({ "owner": owner, "name": name }))
            .await?;
        let node = json
            .pointer("/data/repository")
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Repository {full_name} not found"))?;
        let node: RepoNode = serde_json::from_value(node)
            .context("Failed to deserialize repository response")?;

        Ok(node.into())
    }

    async fn affiliated_repositories(&self) -> Result<Vec<Repository>> {
        let query = format!(
            r#"
            query($after: String) {{
                viewer {{
                    repositories(
                        first: {PAGE_SIZE},
                        after: $after,
                        affiliations: [OWNER, COLLABORATOR, ORGANIZATION_MEMBER],
                        ownerAffiliations: [OWNER, COLLABORATOR, ORGANIZATION_MEMBER]
                    ) {{
                        pageInfo {{
                            hasNextPage
                            endCursor
                        }}
                        nodes {{
                            ...RepoFields
                        }}
                    }}
                }}
            }}
            {REPO_FIELDS}
            "#
        );

        let nodes: Vec<RepoNode> = self
            .connection(&query, json!({}), "/data/viewer/repositories")
            .await?;
        Ok(nodes.into_iter().map(Repository::from).collect())
    }

    async fn organizations(&self, login: &str) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct OrgNode {
            login: String,
        }

        let query = format!(
            r#"
            query($login: String!, $after: String) {{
                user(login: $login) {{
                    organizations(first: {PAGE_SIZE}, after: $after) {{
                        pageInfo {{
                            hasNextPage
                            endCursor
                        }}
                        nodes {{
                            login
                        }}
                    }}
                }}
            }}
            "#
        );

        let nodes: Vec<OrgNode> = self
            .connection(&query, json!({ "login": login }), "/data/user/organizations")
            .await?;
        Ok(nodes.into_iter().map(|n| n.login).collect())
    }

    async fn organization_repositories(&self, org: &str) -> Result<Vec<Repository>> {
        let query = format!(
            r#"
            query($org: String!, $after: String) {{
                organization(login: $org) {{
                    repositories(first: {PAGE_SIZE}, after: $after) {{
                        pageInfo {{
                            hasNextPage
                            endCursor
                        }}
                        nodes {{
                            ...RepoFields
                        }}
                    }}
                }}
            }}
            {REPO_FIELDS}
            "#
        );

        let nodes: Vec<RepoNode> = self
            .connection(&query, json!({ "org": org }), "/data/organization/repositories")
            .await?;
        Ok(nodes.into_iter().map(Repository::from).collect())
    }

    async fn commit_page(
        &self,
        repo: &Repository,
        author: &str,
        window: &Window,
        cursor: Option<&str>,
    ) -> Result<CommitPage> {
        let (owner, name) = split_full_name(&repo.full_name)?;
        let author_id = self.author_id(author).await?;

        let query = format!(
            r#"
            query(
                $owner: String!,
                $name: String!,
                $author: ID!,
                $since: GitTimestamp!,
                $until: GitTimestamp!,
                $after: String
            ) {{
                repository(owner: $owner, name: $name) {{
                    defaultBranchRef {{
                        target {{
                            ... on Commit {{
                                history(
                                    first: {PAGE_SIZE},
                                    after: $after,
                                    author: {{ id: $author }},
                                    since: $since,
                                    until: $until
                                ) {{
                                    pageInfo {{
                                        hasNextPage
                                        endCursor
                                    }}
                                    nodes {{
                                        committedDate
                                        additions
                                        deletions
                                        changedFilesIfAvailable
                                    }}
                                }}
                            }}
                        }}
                    }}
                }}
            }}
            "#
        );

        let variables = json!({
            "owner": owner,
            "name": name,
            "author": author_id,
            "since": git_timestamp(window.since),
            "until": git_timestamp(window.until),
            "after": cursor,
        });
        let json = self.graphql(&query, variables).await?;

        parse_history(&repo.full_name, &json)
    }

    async fn languages(&self, repo: &Repository) -> Result<LanguageBytes> {
        let query = format!(
            r#"
            query($owner: String!, $name: String!, $after: String) {{
                repository(owner: $owner, name: $name) {{
                    languages(
                        first: {PAGE_SIZE},
                        after: $after,
                        orderBy: {{ field: SIZE, direction: DESC }}
                    ) {{
                        pageInfo {{
                            hasNextPage
                            endCursor
                        }}
                        edges {{
                            size
                            node {{
                                name
                            }}
                        }}
                    }}
                }}
            }}
            "#
        );

        let edges: Vec<LanguageEdge> = self
            .connection(
                &query,
                json!({ "owner": repo.owner(), "name": repo.name }),
                "/data/repository/languages",
            )
            .await
            .with_context(|| format!("No language data for {}", repo.full_name))?;

        let mut out = LanguageBytes::new();
        for edge in edges {
            *out.entry(edge.node.name).or_insert(0) += edge.size;
        }
        Ok(out)
    }
}

/// Read one commit-history page out of a `commit_page` response.
///
/// A repository without a default branch is empty, not an error.
fn parse_history(full_name: &str, json: &Value) -> Result<CommitPage> {
    let repository = json
        .pointer("/data/repository")
        .filter(|v| !v.is_null())
        .ok_or_else(|| anyhow::anyhow!("Repository {full_name} not found"))?;

    let Some(history) = repository
        .pointer("/defaultBranchRef/target/history")
        .filter(|v| !v.is_null())
        .cloned()
    else {
        return Ok(CommitPage::default());
    };

    let page: Connection<HistoryNode> = serde_json::from_value(history)
        .context("Failed to deserialize commit history response")?;

    let next = page.next_cursor();
    let commits = page
        .items()
        .map(|n| CommitNode {
            committed_at: n.committed_date,
            additions: n.additions,
            deletions: n.deletions,
            files_changed: n.changed_files_if_available,
        })
        .collect();

    Ok(CommitPage { commits, next })
}
