// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference implementation of [`BranchRepository`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use branchfold_core::{Branch, BranchId, BranchStatus, SessionId};
use parking_lot::RwLock;

use crate::{BranchRepository, StoreError};

#[derive(Default)]
struct Inner {
    branches: HashMap<BranchId, Branch>,
    by_session: HashMap<SessionId, HashSet<BranchId>>,
    by_parent: HashMap<BranchId, HashSet<BranchId>>,
}

/// Keyed storage of branches with indices by session and by parent.
///
/// Reads and writes are protected by a single reader-writer lock: writes are
/// exclusive, reads run concurrently. Both secondary indices are maintained
/// under the write lock so they never observe a partially-applied mutation.
#[derive(Default)]
pub struct InMemoryBranchStore {
    inner: RwLock<Inner>,
}

impl InMemoryBranchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BranchRepository for InMemoryBranchStore {
    async fn create(&self, branch: Branch) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.branches.contains_key(&branch.id) {
            return Err(StoreError::AlreadyExists(branch.id));
        }

        inner
            .by_session
            .entry(branch.session_id.clone())
            .or_default()
            .insert(branch.id.clone());

        if let Some(parent_id) = &branch.parent_id {
            inner
                .by_parent
                .entry(parent_id.clone())
                .or_default()
                .insert(branch.id.clone());
        }

        inner.branches.insert(branch.id.clone(), branch);
        Ok(())
    }

    async fn get(&self, id: &BranchId) -> Result<Branch, StoreError> {
        self.inner
            .read()
            .branches
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update(&self, branch: Branch) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.branches.contains_key(&branch.id) {
            return Err(StoreError::NotFound(branch.id));
        }
        inner.branches.insert(branch.id.clone(), branch);
        Ok(())
    }

    async fn delete(&self, id: &BranchId) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let branch = inner
            .branches
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if let Some(ids) = inner.by_session.get_mut(&branch.session_id) {
            ids.remove(id);
        }
        if let Some(parent_id) = &branch.parent_id {
            if let Some(ids) = inner.by_parent.get_mut(parent_id) {
                ids.remove(id);
            }
        }
        Ok(())
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Vec<Branch> {
        let inner = self.inner.read();
        inner
            .by_session
            .get(session_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.branches.get(id).cloned())
            .collect()
    }

    async fn list_by_parent(&self, parent_id: &BranchId) -> Vec<Branch> {
        let inner = self.inner.read();
        inner
            .by_parent
            .get(parent_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.branches.get(id).cloned())
            .collect()
    }

    async fn get_active_by_session(&self, session_id: &SessionId) -> Option<Branch> {
        let inner = self.inner.read();
        inner
            .by_session
            .get(session_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.branches.get(id))
            .filter(|branch| branch.status == BranchStatus::Active)
            .max_by_key(|branch| (branch.depth, branch.created_at_ms))
            .cloned()
    }

    async fn count_active_by_session(&self, session_id: &SessionId) -> usize {
        let inner = self.inner.read();
        inner
            .by_session
            .get(session_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.branches.get(id))
            .filter(|branch| branch.status == BranchStatus::Active)
            .count()
    }

    async fn complete_if_active(&self, id: &BranchId, result: String, used_budget: u64, now_ms: u64) -> Result<Option<Branch>, StoreError> {
        let mut inner = self.inner.write();
        let branch = inner.branches.get_mut(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if branch.status != BranchStatus::Active {
            return Ok(None);
        }
        branch.complete(result, used_budget, now_ms);
        Ok(Some(branch.clone()))
    }

    async fn force_terminal_if_active(
        &self,
        id: &BranchId,
        status: BranchStatus,
        reason: String,
        used_budget: u64,
        now_ms: u64,
    ) -> Result<Option<Branch>, StoreError> {
        let mut inner = self.inner.write();
        let branch = inner.branches.get_mut(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if branch.status != BranchStatus::Active {
            return Ok(None);
        }
        branch.force_terminal(status, reason, used_budget, now_ms);
        Ok(Some(branch.clone()))
    }
}

#[cfg(test)]
#[path = "in_memory_tests.rs"]
mod tests;
