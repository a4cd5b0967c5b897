//! Apply-now, confirm-or-rollback driver.
//!
//! DESIGN
//! ======
//! `perform` touches the store twice under its lock, never across the remote
//! await:
//!
//! 1. snapshot the region, apply the change, record the region's revision;
//! 2. after the call settles, reconcile (success) or restore (failure).
//!
//! If the region's revision moved while the call was pending, some other
//! change landed on the same columns or thread. Restoring the snapshot then
//! also discards that change, so under `SnapshotThenRefetch` the region is
//! re-fetched from the server after restoring. A failed re-fetch leaves the
//! restored snapshot in place; the original error is what the caller sees.

use std::sync::{Arc, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{Mutation, RollbackPolicy};
use crate::api;
use crate::board::{BoardStateStore, Comment, Region, SharedBoard, Task};
use crate::error::MutationError;
use crate::net::RequestGateway;

pub struct OptimisticMutationController {
    board: SharedBoard,
    gateway: Arc<RequestGateway>,
    policy: RollbackPolicy,
}

impl OptimisticMutationController {
    #[must_use]
    pub fn new(board: SharedBoard, gateway: Arc<RequestGateway>, policy: RollbackPolicy) -> Self {
        Self { board, gateway, policy }
    }

    #[must_use]
    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    #[must_use]
    pub fn policy(&self) -> RollbackPolicy {
        self.policy
    }

    /// Apply `mutation` locally, confirm it remotely, and return the server
    /// body.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the local change cannot be applied (nothing is
    /// sent), or `RolledBack` if the remote call failed. The store is
    /// consistent again in both cases.
    pub async fn perform<M: Mutation + ?Sized>(&self, mutation: &M) -> Result<Value, MutationError> {
        let kind = mutation.kind();
        let region = mutation.region();

        let (snapshot, applied_at) = {
            let mut board = self.lock();
            let snapshot = board.snapshot(&region);
            if let Err(source) = mutation.apply(&mut board) {
                board.restore(snapshot);
                warn!(kind, error = %source, "local change rejected");
                return Err(MutationError::Rejected { kind, source });
            }
            (snapshot, board.region_revision(&region))
        };
        debug!(kind, ?region, "applied optimistically; confirming with server");

        match self.gateway.send(mutation.request()).await {
            Ok(body) => {
                let mut board = self.lock();
                if let Err(e) = mutation.reconcile(&mut board, &body) {
                    warn!(kind, error = %e, "server response could not be reconciled");
                }
                debug!(kind, "mutation confirmed");
                Ok(body)
            }
            Err(source) => {
                let interleaved = {
                    let mut board = self.lock();
                    let interleaved = board.region_revision(&region) != applied_at;
                    board.restore(snapshot);
                    interleaved
                };
                warn!(kind, status = source.status(), interleaved, error = %source, "mutation failed; local change rolled back");

                let refetched = if self.policy.should_refetch(interleaved) { self.refetch(&region).await } else { false };
                Err(MutationError::RolledBack { kind, source, refetched })
            }
        }
    }

    /// Replace `region` with the server's copy. Returns whether every part
    /// of it was refreshed.
    async fn refetch(&self, region: &Region) -> bool {
        match region {
            Region::Columns(column_ids) => {
                let mut complete = true;
                for column_id in column_ids {
                    complete &= self.refetch_column(column_id).await;
                }
                complete
            }
            Region::Comments(task_id) => self.refetch_comments(task_id).await,
        }
    }

    async fn refetch_column(&self, column_id: &str) -> bool {
        let body = match self.gateway.send(api::list_cards(column_id)).await {
            Ok(body) => body,
            Err(e) => {
                warn!(column_id, error = %e, "column re-fetch failed; keeping restored snapshot");
                return false;
            }
        };
        let Some(tasks) = api::decode_many::<Task>(&body, "cards") else {
            warn!(column_id, "column re-fetch returned an unexpected shape");
            return false;
        };
        let replaced = self.lock().replace_column_tasks(column_id, tasks);
        match replaced {
            Ok(()) => {
                info!(column_id, "column re-fetched after rollback");
                true
            }
            Err(e) => {
                warn!(column_id, error = %e, "re-fetched column no longer present");
                false
            }
        }
    }

    async fn refetch_comments(&self, task_id: &str) -> bool {
        let body = match self.gateway.send(api::list_comments(task_id)).await {
            Ok(body) => body,
            Err(e) => {
                warn!(card_id = task_id, error = %e, "comment re-fetch failed; keeping restored snapshot");
                return false;
            }
        };
        let Some(comments) = api::decode_many::<Comment>(&body, "comments") else {
            warn!(card_id = task_id, "comment re-fetch returned an unexpected shape");
            return false;
        };
        self.lock().load_comments(task_id, comments);
        info!(card_id = task_id, "comments re-fetched after rollback");
        true
    }

    fn lock(&self) -> MutexGuard<'_, BoardStateStore> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
