//! Error taxonomy shared by the gateway, the refresh coordinator and the
//! mutation controller.
//!
//! ERROR HANDLING
//! ==============
//! `GatewayError` is `Clone` because one refresh outcome is broadcast to every
//! parked waiter. Transport failures are captured as strings for the same
//! reason. Every error exposes `user_message()` so the UI layer can show a
//! notification without matching on variants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status sentinel for failures where no HTTP response was received.
pub const NETWORK_STATUS: u16 = 0;

const NETWORK_MESSAGE: &str = "Unable to reach the server. Check your connection and try again.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

// =============================================================================
// GATEWAY
// =============================================================================

/// Failure of one logical request issued through the gateway.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// No response was obtained, or a success body could not be parsed.
    #[error("network error: {message}")]
    Network { message: String },

    /// The session could not be renewed. Tokens are already cleared and the
    /// login redirect already issued when this is observed.
    #[error("session expired")]
    AuthExpired,

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String, body: Option<Value> },
}

impl GatewayError {
    pub(crate) fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Build an `Http` error from a non-2xx response, taking the message from
    /// the body when the server supplied one.
    #[must_use]
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(server_message)
            .unwrap_or_else(|| fallback_message(status));
        Self::Http { status, message, body }
    }

    /// HTTP status of the failure; `0` for network-level failures.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Network { .. } => NETWORK_STATUS,
            Self::AuthExpired => 401,
            Self::Http { status, .. } => *status,
        }
    }

    /// Human-readable text for a toast-style notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => NETWORK_MESSAGE.to_owned(),
            Self::AuthExpired => SESSION_EXPIRED_MESSAGE.to_owned(),
            Self::Http { message, .. } => message.clone(),
        }
    }

    /// Render as the `{status, message, data}` envelope used by callers.
    #[must_use]
    pub fn envelope(&self) -> ErrorEnvelope {
        let data = match self {
            Self::Http { body, .. } => body.clone(),
            Self::Network { .. } | Self::AuthExpired => None,
        };
        ErrorEnvelope { status: self.status(), message: self.user_message(), data }
    }
}

fn server_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| {
            body.get(*key)
                .and_then(Value::as_str)
                .filter(|message| !message.trim().is_empty())
        })
        .map(ToOwned::to_owned)
}

fn fallback_message(status: u16) -> String {
    format!("Request failed with status code {status}")
}

/// Error envelope surfaced to the UI layer. `status == 0` means no response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub message: String,
    pub data: Option<Value>,
}

// =============================================================================
// BOARD
// =============================================================================

/// A local change referenced a column or task the store does not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error("unknown comment: {0}")]
    UnknownComment(String),
}

// =============================================================================
// MUTATION
// =============================================================================

/// Failure of an optimistic mutation. Local state is consistent again by the
/// time either variant is returned.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MutationError {
    /// The local change could not be applied; no request was sent.
    #[error("{kind} rejected: {source}")]
    Rejected { kind: &'static str, source: BoardError },

    /// The remote call failed and the local change was rolled back.
    #[error("{kind} rolled back: {source}")]
    RolledBack { kind: &'static str, source: GatewayError, refetched: bool },
}

impl MutationError {
    /// The gateway failure behind a rollback, if any.
    #[must_use]
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            Self::RolledBack { source, .. } => Some(source),
            Self::Rejected { .. } => None,
        }
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self.gateway_error(), Some(GatewayError::AuthExpired))
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { source, .. } => source.to_string(),
            Self::RolledBack { source, .. } => source.user_message(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
