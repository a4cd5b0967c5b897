//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::mutation::RollbackPolicy;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

const TOKEN_DIR: &str = ".boardsync";
const TOKEN_FILE: &str = "tokens.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeouts: Timeouts,
    pub token_file: PathBuf,
    pub login_route: String,
    pub rollback_policy: RollbackPolicy,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `BOARDSYNC_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `BOARDSYNC_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BOARDSYNC_CONNECT_TIMEOUT_SECS`: default 10
    /// - `BOARDSYNC_TOKEN_FILE`: default `$HOME/.boardsync/tokens.json`
    /// - `BOARDSYNC_LOGIN_ROUTE`: default `/login`
    /// - `BOARDSYNC_ROLLBACK_POLICY`: `snapshot`, `refetch-on-conflict` (default) or `always-refetch`
    ///
    /// # Errors
    ///
    /// Returns an error if `BOARDSYNC_ROLLBACK_POLICY` names an unknown policy.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback policy is unknown.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(lookup("BOARDSYNC_BASE_URL").as_deref().unwrap_or(DEFAULT_BASE_URL));
        let timeouts = Timeouts {
            request_secs: parse_u64(lookup("BOARDSYNC_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("BOARDSYNC_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let token_file = lookup("BOARDSYNC_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_token_file(&lookup));
        let login_route = lookup("BOARDSYNC_LOGIN_ROUTE").unwrap_or_else(|| DEFAULT_LOGIN_ROUTE.to_string());
        let rollback_policy = parse_rollback_policy(lookup("BOARDSYNC_ROLLBACK_POLICY").as_deref())?;

        Ok(Self { base_url, timeouts, token_file, login_route, rollback_policy })
    }

    /// Override the base URL (e.g. from a CLI flag).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.parse::<u64>().ok()).unwrap_or(default)
}

fn default_token_file(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    let home = lookup("HOME")
        .or_else(|| lookup("USERPROFILE"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(TOKEN_DIR).join(TOKEN_FILE)
}

fn parse_rollback_policy(raw: Option<&str>) -> Result<RollbackPolicy, ConfigError> {
    match raw.unwrap_or("refetch-on-conflict") {
        "snapshot" => Ok(RollbackPolicy::Snapshot),
        "refetch-on-conflict" => Ok(RollbackPolicy::SnapshotThenRefetch),
        "always-refetch" => Ok(RollbackPolicy::AlwaysRefetch),
        other => Err(ConfigError::Parse(format!(
            "unknown BOARDSYNC_ROLLBACK_POLICY '{other}' (expected 'snapshot', 'refetch-on-conflict' or 'always-refetch')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
