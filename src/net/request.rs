//! Description of one logical HTTP call.

use reqwest::Method;
use serde_json::Value;

use crate::api::REFRESH_PATH;

/// A pending request: method, path (relative to the API base URL), headers,
/// optional JSON body, and retry bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Set on the single replay issued after a successful refresh.
    pub is_retry: bool,
    /// Cleared for credential-issuing endpoints (login, register, logout)
    /// whose 401 means "bad credentials", not "stale token".
    pub refresh_on_401: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: Vec::new(), body: None, is_retry: false, refresh_on_401: true }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a header, replacing any existing value with the same name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.into()));
        self
    }

    /// Add the JSON content negotiation headers every call carries.
    #[must_use]
    pub fn with_json_headers(self) -> Self {
        self.with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json")
    }

    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_401 = false;
        self
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether this call targets the token refresh endpoint.
    #[must_use]
    pub fn is_refresh(&self) -> bool {
        self.path.split('?').next() == Some(REFRESH_PATH)
    }

    pub(crate) fn into_retry(mut self) -> Self {
        self.is_retry = true;
        self
    }
}

#[cfg(test)]
#[path = "request_test.rs"]
mod tests;
