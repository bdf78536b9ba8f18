// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! branchfold-store: keyed storage of branches with indices by session and
//! by parent, and copy-on-read snapshot semantics.

mod in_memory;

pub use in_memory::InMemoryBranchStore;

use async_trait::async_trait;
use branchfold_core::{Branch, BranchId, BranchStatus, SessionId};
use thiserror::Error;

/// Errors surfaced by a [`BranchRepository`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("branch not found: {0}")]
    NotFound(BranchId),
    #[error("branch already exists: {0}")]
    AlreadyExists(BranchId),
}

/// Persistence port for branch records.
///
/// Implementations must return independent copies on every read so callers
/// cannot mutate stored state in place. The reference implementation is
/// in-memory; the core does not persist branches across process restarts.
#[async_trait]
pub trait BranchRepository: Send + Sync + 'static {
    async fn create(&self, branch: Branch) -> Result<(), StoreError>;

    async fn get(&self, id: &BranchId) -> Result<Branch, StoreError>;

    /// Overwrite the whole record. Rejects an id that does not already exist.
    async fn update(&self, branch: Branch) -> Result<(), StoreError>;

    async fn delete(&self, id: &BranchId) -> Result<(), StoreError>;

    async fn list_by_session(&self, session_id: &SessionId) -> Vec<Branch>;

    async fn list_by_parent(&self, parent_id: &BranchId) -> Vec<Branch>;

    /// The deepest active branch for the session, breaking ties by most
    /// recent creation timestamp. `None` if the session has no active
    /// branch.
    async fn get_active_by_session(&self, session_id: &SessionId) -> Option<Branch>;

    async fn count_active_by_session(&self, session_id: &SessionId) -> usize;

    /// Atomically transition `id` from `active` to `completed` if it is
    /// still active, in a single critical section covering both the check
    /// and the write. Returns the updated snapshot to the caller that won
    /// the transition; every other concurrent caller (and any caller
    /// arriving after the branch already reached a terminal state) gets
    /// `Ok(None)` and must treat it as an idempotent no-op.
    async fn complete_if_active(&self, id: &BranchId, result: String, used_budget: u64, now_ms: u64) -> Result<Option<Branch>, StoreError>;

    /// Same atomicity guarantee as [`complete_if_active`](Self::complete_if_active),
    /// for the force-return path (`timeout` or `failed`).
    async fn force_terminal_if_active(
        &self,
        id: &BranchId,
        status: BranchStatus,
        reason: String,
        used_budget: u64,
        now_ms: u64,
    ) -> Result<Option<Branch>, StoreError>;
}
