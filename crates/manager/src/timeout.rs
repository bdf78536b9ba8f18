// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-branch cancellable timeout watcher.
//!
//! One cooperative timer per active branch, running as its own task so it
//! can be raced against cancellation independently of the caller's request
//! context. The watcher owns no branch state -- it is pure signalling: it
//! either observes cancellation and exits silently, or fires and emits a
//! `timeout` event for the manager (a bus subscriber) to act on.

use std::sync::Arc;
use std::time::Duration;

use branchfold_bus::EventBus;
use branchfold_core::{BranchEvent, BranchId};
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// A handle to a running timeout watcher. Dropping the handle without
/// cancelling leaves the watcher task running to completion.
pub struct TimeoutHandle {
    cancel_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl TimeoutHandle {
    /// Cancel the watcher. Idempotent and race-free: cancelling an
    /// already-fired or already-cancelled watcher is a no-op.
    pub fn cancel(&self) {
        if let Some(tx) = self.cancel_tx.lock().take() {
            let _ = tx.send(());
        }
    }
}

/// Start a timer for `branch_id` that fires a `timeout` event on `bus`
/// after `timeout_seconds`, unless cancelled first.
pub fn spawn(branch_id: BranchId, timeout_seconds: u64, bus: Arc<EventBus>) -> TimeoutHandle {
    let (cancel_tx, cancel_rx) = oneshot::channel();

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(timeout_seconds)) => {
                tracing::debug!(branch_id = %branch_id, timeout_seconds, "branch timeout watcher fired");
                bus.emit(BranchEvent::Timeout {
                    branch_id,
                    timeout_seconds,
                });
            }
            _ = cancel_rx => {
                tracing::trace!(branch_id = %branch_id, "branch timeout watcher cancelled");
            }
        }
    });

    TimeoutHandle {
        cancel_tx: Mutex::new(Some(cancel_tx)),
    }
}

#[cfg(test)]
#[path = "timeout_tests.rs"]
mod tests;
