// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! branchfold-budget: per-branch token accounting with warning/exhausted
//! event fan-out and threshold deduplication.
//!
//! The tracker never calls back into the manager directly. It stages events
//! while holding its lock, releases the lock, then emits -- emitting under
//! the lock would deadlock a subscriber that re-enters the tracker.

use std::collections::HashMap;
use std::sync::Arc;

use branchfold_bus::EventBus;
use branchfold_core::{BranchEvent, BranchId};
use parking_lot::Mutex;
use thiserror::Error;

/// The largest value `used` or `total` may take. A signed 63-bit ceiling
/// (rather than `i64::MAX`) leaves headroom for callers that tag budgets
/// into a wider integer without risking sign overflow on their side.
pub const MAX_BUDGET: i64 = (1i64 << 62) - 1;

/// The usage ratio at or above which a warning event is staged, once per
/// branch lifetime.
pub const WARNING_THRESHOLD: f64 = 0.8;

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("no budget record for branch {0}")]
    NotFound(BranchId),
    #[error("invalid budget: {0}")]
    Invalid(String),
    #[error("budget exhausted for branch {0}")]
    Exhausted(BranchId),
}

#[derive(Debug, Clone)]
struct BudgetState {
    total: i64,
    used: i64,
    warning_emitted: bool,
}

/// Per-branch token accounting, independent across branches.
pub struct BudgetTracker {
    bus: Arc<EventBus>,
    states: Mutex<HashMap<BranchId, BudgetState>>,
}

impl BudgetTracker {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Open a budget record for `branch_id` with the given total.
    pub fn allocate(&self, branch_id: &BranchId, total: u64) -> Result<(), BudgetError> {
        let total = total as i64;
        if total <= 0 || total > MAX_BUDGET {
            return Err(BudgetError::Invalid(format!("total {total} out of range")));
        }
        self.states.lock().insert(
            branch_id.clone(),
            BudgetState {
                total,
                used: 0,
                warning_emitted: false,
            },
        );
        Ok(())
    }

    /// Attempt to consume `n` tokens from `branch_id`'s budget.
    ///
    /// On exhaustion the state is left unchanged and a `BudgetExhausted`
    /// event is emitted after the lock is released. On a crossing of the
    /// warning threshold, a `BudgetWarning` event is emitted the same way,
    /// at most once per branch.
    pub fn consume(&self, branch_id: &BranchId, n: i64) -> Result<(), BudgetError> {
        if n < 0 {
            return Err(BudgetError::Invalid(format!("negative consumption: {n}")));
        }

        enum Staged {
            None,
            Warning { used: u64, total: u64, percentage: f64 },
            Exhausted { used: u64, total: u64 },
        }

        let staged = {
            let mut states = self.states.lock();
            let state = states
                .get_mut(branch_id)
                .ok_or_else(|| BudgetError::NotFound(branch_id.clone()))?;

            let new_used = state
                .used
                .checked_add(n)
                .filter(|v| *v <= MAX_BUDGET)
                .ok_or_else(|| BudgetError::Invalid(format!("overflow consuming {n} tokens")))?;

            if new_used > state.total {
                Staged::Exhausted {
                    used: state.used as u64,
                    total: state.total as u64,
                }
            } else {
                state.used = new_used;
                let ratio = new_used as f64 / state.total as f64;
                if ratio >= WARNING_THRESHOLD && !state.warning_emitted {
                    state.warning_emitted = true;
                    Staged::Warning {
                        used: new_used as u64,
                        total: state.total as u64,
                        percentage: ratio,
                    }
                } else {
                    Staged::None
                }
            }
        };

        match staged {
            Staged::None => Ok(()),
            Staged::Warning { used, total, percentage } => {
                self.bus.emit(BranchEvent::BudgetWarning {
                    branch_id: branch_id.clone(),
                    used,
                    total,
                    percentage,
                });
                Ok(())
            }
            Staged::Exhausted { used, total } => {
                self.bus.emit(BranchEvent::BudgetExhausted {
                    branch_id: branch_id.clone(),
                    used,
                    total,
                });
                Err(BudgetError::Exhausted(branch_id.clone()))
            }
        }
    }

    pub fn remaining(&self, branch_id: &BranchId) -> Result<u64, BudgetError> {
        let states = self.states.lock();
        let state = states.get(branch_id).ok_or_else(|| BudgetError::NotFound(branch_id.clone()))?;
        Ok((state.total - state.used) as u64)
    }

    pub fn used(&self, branch_id: &BranchId) -> Result<u64, BudgetError> {
        let states = self.states.lock();
        let state = states.get(branch_id).ok_or_else(|| BudgetError::NotFound(branch_id.clone()))?;
        Ok(state.used as u64)
    }

    pub fn is_exhausted(&self, branch_id: &BranchId) -> Result<bool, BudgetError> {
        let states = self.states.lock();
        let state = states.get(branch_id).ok_or_else(|| BudgetError::NotFound(branch_id.clone()))?;
        Ok(state.used >= state.total)
    }

    /// Close out the budget record. Idempotent: deallocating a branch with
    /// no record is not an error.
    pub fn deallocate(&self, branch_id: &BranchId) {
        self.states.lock().remove(branch_id);
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
