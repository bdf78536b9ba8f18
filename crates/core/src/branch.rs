// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Branch entity and lifecycle status.
//!
//! A branch is an isolated sub-context spawned from a session with its own
//! budget and timeout. The store owns the persistent record; the manager
//! mutates it only through whole-snapshot reads and writes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::{BranchId, CallerId, ProjectId, SessionId};

/// Status of a branch in its lifecycle.
///
/// Valid transitions: `active -> completed`, `active -> timeout`,
/// `active -> failed`. `created` exists for extensibility but the manager
/// never persists a branch in that state today -- a successfully persisted
/// branch is `active` immediately. No transition leaves a terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchStatus {
    /// Branch record exists but has not yet been activated.
    #[default]
    Created,
    /// Branch is live: it holds a budget allocation and a timeout watcher.
    Active,
    /// Returned normally via `Return`.
    Completed,
    /// The timeout watcher fired before the branch was returned.
    Timeout,
    /// Force-returned for a reason other than timeout (budget exhaustion,
    /// cascade from a parent, session cleanup).
    Failed,
}

impl BranchStatus {
    /// True for any of `completed`, `timeout`, `failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BranchStatus::Completed | BranchStatus::Timeout | BranchStatus::Failed
        )
    }

    /// Whether transitioning from `self` to `next` is permitted.
    pub fn can_transition_to(&self, next: &BranchStatus) -> bool {
        match self {
            BranchStatus::Active => matches!(
                next,
                BranchStatus::Completed | BranchStatus::Timeout | BranchStatus::Failed
            ),
            BranchStatus::Created => matches!(next, BranchStatus::Active),
            _ => false,
        }
    }
}

impl fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchStatus::Created => write!(f, "created"),
            BranchStatus::Active => write!(f, "active"),
            BranchStatus::Completed => write!(f, "completed"),
            BranchStatus::Timeout => write!(f, "timeout"),
            BranchStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A single injected-memory reference recorded on a branch at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectedMemory {
    pub id: String,
    pub tokens: u64,
}

/// An isolated sub-context with its own budget and timeout.
///
/// Owned by the branch store; the manager obtains snapshot copies for reads
/// and writes back whole updated snapshots. Completion never deletes a
/// record -- terminal branches remain queryable until explicit deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub session_id: SessionId,
    pub project_id: ProjectId,
    pub caller_id: CallerId,
    pub parent_id: Option<BranchId>,
    pub depth: u32,
    pub description: String,
    pub prompt: String,
    pub total_budget: u64,
    pub used_budget: u64,
    pub timeout_seconds: u64,
    pub status: BranchStatus,
    pub result: Option<String>,
    pub error: Option<String>,
    pub injected_memories: Vec<InjectedMemory>,
    pub created_at_ms: u64,
    pub completed_at_ms: Option<u64>,
}

impl Branch {
    /// True once `status` is any terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Mark the branch completed with a scrubbed result.
    pub fn complete(&mut self, result: String, used_budget: u64, now_ms: u64) {
        self.status = BranchStatus::Completed;
        self.result = Some(result);
        self.used_budget = used_budget;
        self.completed_at_ms = Some(now_ms);
    }

    /// Force the branch into a terminal failure state (`timeout` or
    /// `failed`) with the given reason recorded as its error text.
    pub fn force_terminal(&mut self, status: BranchStatus, reason: impl Into<String>, used_budget: u64, now_ms: u64) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.error = Some(reason.into());
        self.used_budget = used_budget;
        self.completed_at_ms = Some(now_ms);
    }
}

#[cfg(test)]
#[path = "branch_tests.rs"]
mod tests;
