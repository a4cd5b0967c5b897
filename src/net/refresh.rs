//! Single-flight access-token refresh.
//!
//! DESIGN
//! ======
//! `Idle -> Refreshing -> Idle`. The first caller to observe `Idle` flips the
//! state under the lock and becomes the leader; it alone issues
//! `POST /api/auth/refresh`. Callers arriving while `Refreshing` park a
//! oneshot sender (a waiter) and await it. When the leader settles it swaps
//! the state back to `Idle`, takes the waiter queue in one step, and sends the
//! same outcome to every waiter in arrival order.
//!
//! The check-and-set never spans an await, so two refresh calls cannot
//! overlap. If the leader future is dropped before settling, its guard
//! releases the waiters with a network error instead of leaving them parked.
//!
//! Failure of any kind (no refresh token, non-2xx, transport failure, body
//! without an access token) clears the token store and redirects to the
//! login route before the waiters observe `AuthExpired`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::transport::HttpTransport;
use crate::api;
use crate::error::GatewayError;
use crate::navigation::{Navigator, redirect_to_login};
use crate::token::{IssuedTokens, TokenStore};

const ABANDONED_MESSAGE: &str = "token refresh was abandoned before completing";

/// Observable refresh state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

type Waiter = oneshot::Sender<Result<(), GatewayError>>;

enum Phase {
    Idle,
    Refreshing(Vec<Waiter>),
}

pub struct RefreshCoordinator {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    phase: Mutex<Phase>,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self { transport, tokens, navigator, login_route: login_route.into(), phase: Mutex::new(Phase::Idle) }
    }

    #[must_use]
    pub fn state(&self) -> RefreshState {
        match *self.lock() {
            Phase::Idle => RefreshState::Idle,
            Phase::Refreshing(_) => RefreshState::Refreshing,
        }
    }

    /// Number of callers parked behind the in-flight refresh.
    #[must_use]
    pub fn waiting(&self) -> usize {
        match &*self.lock() {
            Phase::Idle => 0,
            Phase::Refreshing(waiters) => waiters.len(),
        }
    }

    /// Obtain a fresh access token, joining an in-flight refresh if there is
    /// one. `Ok(())` means "retry now"; the new token is already stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` when the session cannot be renewed, or a network
    /// error if the leading refresh was abandoned.
    pub async fn acquire(&self) -> Result<(), GatewayError> {
        let parked = {
            let mut phase = self.lock();
            match &mut *phase {
                Phase::Refreshing(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                Phase::Idle => {
                    *phase = Phase::Refreshing(Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = parked {
            debug!("refresh already in flight; waiting for outcome");
            return rx
                .await
                .unwrap_or_else(|_| Err(GatewayError::network(ABANDONED_MESSAGE)));
        }

        let mut guard = LeaderGuard { coordinator: self, armed: true };
        let outcome = self.refresh().await;
        guard.armed = false;
        self.settle(&outcome);
        outcome
    }

    async fn refresh(&self) -> Result<(), GatewayError> {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            warn!("no refresh token stored; session cannot be renewed");
            self.expire_session();
            return Err(GatewayError::AuthExpired);
        };

        info!("refreshing access token");
        let request = api::refresh(&refresh_token).with_json_headers();
        let response = match self.transport.execute(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "refresh request failed");
                self.expire_session();
                return Err(GatewayError::AuthExpired);
            }
        };

        if !response.is_success() {
            warn!(status = response.status, "refresh rejected by server");
            self.expire_session();
            return Err(GatewayError::AuthExpired);
        }

        let issued = response.json().ok().flatten().as_ref().and_then(IssuedTokens::from_body);
        let Some(issued) = issued else {
            warn!("refresh response carried no access token");
            self.expire_session();
            return Err(GatewayError::AuthExpired);
        };

        if let Err(e) = self
            .tokens
            .save_pair(&issued.access_token, issued.refresh_token.as_deref())
        {
            warn!(error = %e, "failed to persist refreshed tokens");
        }
        info!(rotated = issued.refresh_token.is_some(), "access token refreshed");
        Ok(())
    }

    fn expire_session(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear token store");
        }
        redirect_to_login(self.navigator.as_ref(), &self.login_route);
    }

    fn settle(&self, outcome: &Result<(), GatewayError>) {
        let waiters = match std::mem::replace(&mut *self.lock(), Phase::Idle) {
            Phase::Refreshing(waiters) => waiters,
            Phase::Idle => Vec::new(),
        };
        debug!(waiters = waiters.len(), ok = outcome.is_ok(), "refresh settled; releasing waiters");
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("refresh leader dropped mid-flight; releasing waiters");
            self.coordinator
                .settle(&Err(GatewayError::network(ABANDONED_MESSAGE)));
        }
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
