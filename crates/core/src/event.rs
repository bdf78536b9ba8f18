// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle events emitted by the budget tracker, timeout watchers, and the
//! branch manager. Delivered synchronously through the event bus.

use serde::{Deserialize, Serialize};

use crate::id::BranchId;

/// A lifecycle event carrying a branch id plus type-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BranchEvent {
    /// Usage crossed the warning threshold (>= 80% of total) for the first
    /// time in this branch's lifetime.
    #[serde(rename = "budget_warning")]
    BudgetWarning {
        branch_id: BranchId,
        used: u64,
        total: u64,
        percentage: f64,
    },

    /// A `Consume` would have exceeded `total`; state was left unchanged.
    #[serde(rename = "budget_exhausted")]
    BudgetExhausted {
        branch_id: BranchId,
        used: u64,
        total: u64,
    },

    /// The branch's timeout watcher fired before it reached a terminal
    /// state through any other channel.
    #[serde(rename = "timeout")]
    Timeout { branch_id: BranchId, timeout_seconds: u64 },

    /// The branch reached a terminal state, successfully or otherwise.
    #[serde(rename = "completed")]
    Completed {
        branch_id: BranchId,
        tokens_used: u64,
        success: bool,
    },
}

impl BranchEvent {
    /// The branch this event concerns, regardless of variant.
    pub fn branch_id(&self) -> &BranchId {
        match self {
            BranchEvent::BudgetWarning { branch_id, .. } => branch_id,
            BranchEvent::BudgetExhausted { branch_id, .. } => branch_id,
            BranchEvent::Timeout { branch_id, .. } => branch_id,
            BranchEvent::Completed { branch_id, .. } => branch_id,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
