// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires a [`BranchManager`] to in-memory/noop reference adapters.
//!
//! There is exactly one production-shaped wiring today: in-memory store,
//! pattern-based scrubber, permissive validator, no memory searcher, UUID
//! ids, and the system clock. A richer host embedding the core would swap
//! these for its own repository/scrubber/validator implementations; `bfctl`
//! exists to exercise the reference wiring, not to be that host.

use std::sync::Arc;

use branchfold_adapters::scrubber::PatternScrubber;
use branchfold_adapters::validator::PermissiveValidator;
use branchfold_core::{SystemClock, UuidIdGen};
use branchfold_manager::{BranchManager, ManagerConfig};
use branchfold_store::InMemoryBranchStore;

pub fn build(config: ManagerConfig) -> Arc<BranchManager<SystemClock>> {
    BranchManager::new(
        config,
        Arc::new(InMemoryBranchStore::new()),
        Arc::new(PatternScrubber::new()),
        Arc::new(PermissiveValidator::new()),
        None,
        Arc::new(UuidIdGen),
        SystemClock,
    )
}
