//! Optimistic mutations over the shared board.
//!
//! DESIGN
//! ======
//! A mutation is a typed value describing one user action. The controller
//! drives every kind through the same discipline: snapshot the region, apply
//! locally, send, then reconcile on success or restore on failure. Kinds
//! differ only in which region they touch, how they change the store, which
//! request they send and which server fields they adopt.

pub mod cards;
pub mod comments;
pub mod controller;

use serde_json::Value;

use crate::board::{BoardStateStore, Region};
use crate::error::BoardError;
use crate::net::ApiRequest;

pub use cards::{CardChanges, CreateCard, DeleteCard, MoveCard, UpdateCard};
pub use comments::{CreateComment, DeleteComment, UpdateComment};
pub use controller::OptimisticMutationController;

/// One user-initiated state change.
pub trait Mutation: Send + Sync {
    /// Short label used in logs and errors, e.g. `card.move`.
    fn kind(&self) -> &'static str;

    /// Part of the store this mutation reads and writes.
    fn region(&self) -> Region;

    /// Apply the change locally. Must either succeed or leave the store
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the change references unknown records.
    fn apply(&self, board: &mut BoardStateStore) -> Result<(), BoardError>;

    /// Remote call confirming the change.
    fn request(&self) -> ApiRequest;

    /// Adopt server-authoritative fields from a successful response.
    ///
    /// # Errors
    ///
    /// Returns an error if the records being reconciled are gone.
    fn reconcile(&self, _board: &mut BoardStateStore, _body: &Value) -> Result<(), BoardError> {
        Ok(())
    }
}

/// What to do after restoring a snapshot on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackPolicy {
    /// Restore the snapshot and nothing else.
    Snapshot,
    /// Restore, then re-fetch the region if another change touched it while
    /// the call was in flight.
    #[default]
    SnapshotThenRefetch,
    /// Restore, then always re-fetch the region.
    AlwaysRefetch,
}

impl RollbackPolicy {
    #[must_use]
    pub fn should_refetch(self, interleaved: bool) -> bool {
        match self {
            Self::Snapshot => false,
            Self::SnapshotThenRefetch => interleaved,
            Self::AlwaysRefetch => true,
        }
    }
}
