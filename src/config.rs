use std::env;

pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";

/// Collection settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Access token (GH_TOKEN)
    pub token: String,
    /// Account whose commits are counted (GH_USERNAME)
    pub username: String,
    /// Explicit `owner/name` allowlist (REPOS_TO_TRACK); empty means discover
    pub repos_to_track: Vec<String>,
    /// Record repositories whose queries failed (FLAG_INCOMPLETE_REPOS)
    pub flag_incomplete: bool,
    /// GraphQL endpoint (GH_API_URL)
    pub api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnvVar(key))
        };

        let token = required("GH_TOKEN")?;
        let username = required("GH_USERNAME")?;

        let repos_to_track = parse_repo_list(&lookup("REPOS_TO_TRACK").unwrap_or_default());

        let flag_incomplete = match lookup("FLAG_INCOMPLETE_REPOS") {
            Some(raw) => {
                parse_flag(&raw).ok_or(ConfigError::InvalidValue("FLAG_INCOMPLETE_REPOS"))?
            }
            None => false,
        };

        let api_url = lookup("GH_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            token,
            username,
            repos_to_track,
            flag_incomplete,
            api_url,
        })
    }
}

/// Split a comma-separated allowlist, keeping only `owner/name` entries.
pub fn parse_repo_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in raw.split(',').map(str::trim) {
        if entry.is_empty() || !entry.contains('/') {
            continue;
        }
        if !out.iter().any(|seen| seen == entry) {
            out.push(entry.to_string());
        }
    }
    out
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Some(false),
        "1" | "true" | "yes" | "on" => Some(true),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
