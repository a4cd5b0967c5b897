//! Token extraction from auth responses.
//!
//! The backend is not consistent about where it puts issued tokens, so each
//! kind has a fixed, ordered list of candidate field paths. The first path
//! holding a non-empty string wins:
//!
//! - access token: `accessToken`, `token`, `data.accessToken`, `data.token`
//! - refresh token: `refreshToken`, `data.refreshToken`

use serde_json::Value;

const ACCESS_TOKEN_PATHS: &[&[&str]] = &[&["accessToken"], &["token"], &["data", "accessToken"], &["data", "token"]];
const REFRESH_TOKEN_PATHS: &[&[&str]] = &[&["refreshToken"], &["data", "refreshToken"]];

/// Access token from an auth response body, if any.
#[must_use]
pub fn access_token(body: &Value) -> Option<String> {
    first_string(body, ACCESS_TOKEN_PATHS)
}

/// Refresh token from an auth response body, if any. Absence means the
/// server did not rotate it.
#[must_use]
pub fn refresh_token(body: &Value) -> Option<String> {
    first_string(body, REFRESH_TOKEN_PATHS)
}

fn first_string(body: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| {
        path.iter()
            .try_fold(body, |value, key| value.get(*key))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(ToOwned::to_owned)
    })
}

/// Tokens issued by a login, register or refresh response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl IssuedTokens {
    /// Normalize a response body. `None` when no access token is present.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        Some(Self { access_token: access_token(body)?, refresh_token: refresh_token(body) })
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
