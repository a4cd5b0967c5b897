//! Session lifecycle: login, register and logout.
//!
//! Login and register store the issued token pair. Logout tells the server
//! best-effort and always clears local tokens, so a dead backend never
//! leaves a stale session behind.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::api;
use crate::error::GatewayError;
use crate::net::{ApiRequest, RequestGateway};
use crate::token::{IssuedTokens, StoreError, TokenStore};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("server response did not include an access token")]
    MissingToken,
    #[error("failed to store tokens: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Gateway(e) => e.user_message(),
            Self::MissingToken | Self::Store(_) => self.to_string(),
        }
    }
}

pub struct AuthApi {
    gateway: Arc<RequestGateway>,
}

impl AuthApi {
    #[must_use]
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    fn tokens(&self) -> &TokenStore {
        self.gateway.tokens()
    }

    /// Exchange credentials for a token pair and store it. Returns the
    /// server body (user profile and tokens).
    ///
    /// # Errors
    ///
    /// Returns an error if the server refuses, the body holds no access
    /// token, or the tokens cannot be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, AuthError> {
        let body = self.issue(api::login(email, password)).await?;
        info!("logged in");
        Ok(body)
    }

    /// Create an account and store its token pair.
    ///
    /// # Errors
    ///
    /// Same as [`AuthApi::login`].
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Value, AuthError> {
        let body = self.issue(api::register(name, email, password)).await?;
        info!("registered and logged in");
        Ok(body)
    }

    /// End the session. Server failures are logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if local tokens cannot be cleared.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let refresh_token = self.tokens().refresh_token();
        if let Err(e) = self.gateway.send(api::logout(refresh_token.as_deref())).await {
            warn!(status = e.status(), error = %e, "server logout failed; clearing local session anyway");
        }
        self.tokens().clear()?;
        info!("logged out");
        Ok(())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_authenticated()
    }

    async fn issue(&self, request: ApiRequest) -> Result<Value, AuthError> {
        let body = self.gateway.send(request).await?;
        let issued = IssuedTokens::from_body(&body).ok_or(AuthError::MissingToken)?;
        // A new session never inherits the previous refresh token.
        self.tokens().clear()?;
        self.tokens()
            .save_pair(&issued.access_token, issued.refresh_token.as_deref())?;
        Ok(body)
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
