//! Credential storage and response normalization.
//!
//! `store` holds the access/refresh pair behind an abstract key-value store;
//! `normalize` is the single place that knows which response fields may carry
//! a token.

pub mod normalize;
pub mod store;

pub use normalize::IssuedTokens;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, TokenStore};
