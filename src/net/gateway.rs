//! Authenticated request gateway.
//!
//! ERROR HANDLING
//! ==============
//! - 2xx: body parsed as JSON (empty body is `Value::Null`); unparseable body
//!   is a network-class failure.
//! - 401 on a first attempt that is neither the refresh endpoint nor a
//!   credential endpoint: wait on the shared refresh, then replay once with
//!   `is_retry` set. A refresh failure surfaces as `AuthExpired`. If the
//!   stored token already differs from the one the request carried, a
//!   refresh settled while it was in flight and the replay goes out directly.
//! - 401 on a replay or on the refresh endpoint: fail immediately.
//! - Anything else non-2xx: `Http { status, message, body }`.
//! - No response: `Network` (status 0).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::refresh::RefreshCoordinator;
use super::request::ApiRequest;
use super::transport::{HttpResponse, HttpTransport};
use crate::api;
use crate::error::GatewayError;
use crate::token::TokenStore;

pub struct RequestGateway {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    refresh: Arc<RefreshCoordinator>,
}

impl RequestGateway {
    /// `tokens` and `refresh` must be the process-wide shared instances.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: TokenStore, refresh: Arc<RefreshCoordinator>) -> Self {
        Self { transport, tokens, refresh }
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Issue one logical call.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] per the classification in the module docs.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, GatewayError> {
        let sent_with = self.tokens.access_token();
        let response = self.dispatch(&request, sent_with.as_deref()).await?;
        if response.is_success() {
            return parse_success(&response);
        }

        if response.status == 401 && !request.is_retry && !request.is_refresh() && request.refresh_on_401 {
            let current = self.tokens.access_token();
            if current.is_some() && current != sent_with {
                debug!(method = %request.method, path = %request.path, "token already renewed; retrying without refresh");
            } else {
                info!(method = %request.method, path = %request.path, "access token rejected; refreshing before retry");
                self.refresh.acquire().await?;
            }

            let retry = request.into_retry();
            let token = self.tokens.access_token();
            let response = self.dispatch(&retry, token.as_deref()).await?;
            if response.is_success() {
                return parse_success(&response);
            }
            return Err(failure(&retry, &response));
        }

        Err(failure(&request, &response))
    }

    /// Issue a call and decode its (possibly `data`-wrapped) body.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] from [`RequestGateway::send`], or a
    /// network-class error when the body does not decode as `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, GatewayError> {
        let path = request.path.clone();
        let body = self.send(request).await?;
        serde_json::from_value(api::payload(&body).clone())
            .map_err(|e| GatewayError::network(format!("unexpected response shape from {path}: {e}")))
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<HttpResponse, GatewayError> {
        let prepared = prepare(request, token);
        debug!(method = %prepared.method, path = %prepared.path, retry = prepared.is_retry, "sending request");
        let response = self.transport.execute(&prepared).await.map_err(|e| {
            warn!(method = %prepared.method, path = %prepared.path, error = %e, "no response received");
            GatewayError::network(e.0)
        })?;
        debug!(method = %prepared.method, path = %prepared.path, status = response.status, "response received");
        Ok(response)
    }
}

fn prepare(request: &ApiRequest, token: Option<&str>) -> ApiRequest {
    let prepared = request.clone().with_json_headers();
    match token {
        Some(token) => prepared.with_header("Authorization", format!("Bearer {token}")),
        None => prepared,
    }
}

fn parse_success(response: &HttpResponse) -> Result<Value, GatewayError> {
    response
        .json()
        .map(Option::unwrap_or_default)
        .map_err(|e| GatewayError::network(format!("invalid response body: {e}")))
}

fn failure(request: &ApiRequest, response: &HttpResponse) -> GatewayError {
    let body = response.json().ok().flatten();
    let error = GatewayError::from_response(response.status, body);
    warn!(method = %request.method, path = %request.path, status = response.status, retry = request.is_retry, "request failed");
    error
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
