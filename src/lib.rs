//! boardsync: client-side sync layer for a project-management REST backend.
//!
//! ARCHITECTURE
//! ============
//! Two coupled mechanisms sit between UI actions and the backend:
//!
//! - `net`: the authenticated [`RequestGateway`] and its single-flight
//!   [`RefreshCoordinator`]. Every call carries the current bearer token; a
//!   401 parks the caller until exactly one refresh settles, then the call is
//!   replayed once.
//! - `mutation`: the [`OptimisticMutationController`], which applies a change
//!   to the shared [`BoardStateStore`] immediately, confirms it against the
//!   server, and restores the captured snapshot when the server refuses.
//!
//! Tokens live behind [`TokenStore`] (an abstract key-value store) and
//! navigation is delegated to a [`Navigator`]. [`BoardClient`] wires a single
//! shared instance of each so the single-flight guarantee holds process-wide.

pub mod api;
pub mod auth;
pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod mutation;
pub mod navigation;
pub mod net;
pub mod token;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use auth::AuthApi;
pub use board::{BoardStateStore, Column, Comment, Region, SharedBoard, Task};
pub use client::BoardClient;
pub use config::ClientConfig;
pub use error::{BoardError, ErrorEnvelope, GatewayError, MutationError};
pub use mutation::{Mutation, OptimisticMutationController, RollbackPolicy};
pub use navigation::{InMemoryNavigator, Navigator};
pub use net::{ApiRequest, HttpTransport, RefreshCoordinator, RefreshState, RequestGateway, ReqwestTransport};
pub use token::{FileStore, KeyValueStore, MemoryStore, TokenStore};
