//! Authenticated HTTP plumbing.
//!
//! ARCHITECTURE
//! ============
//! `RequestGateway` is the only path by which domain code talks to the
//! backend. It attaches the bearer token, classifies failures, and on a 401
//! defers to the shared `RefreshCoordinator` before replaying the request
//! exactly once. `HttpTransport` is the I/O seam underneath both; production
//! uses `ReqwestTransport`, tests substitute scripted transports.

pub mod gateway;
pub mod refresh;
pub mod request;
pub mod transport;

pub use gateway::RequestGateway;
pub use refresh::{RefreshCoordinator, RefreshState};
pub use request::ApiRequest;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
