// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! branchfold-bus: single-producer-many-subscriber dispatch of branch
//! lifecycle events.
//!
//! `Emit` delivers synchronously to each subscriber in subscription order.
//! The bus copies its handler list under a short lock and invokes handlers
//! after releasing it, so a handler may safely subscribe more handlers or
//! emit further events without deadlocking the bus itself.

use std::sync::Arc;

use branchfold_core::BranchEvent;
use parking_lot::RwLock;

/// A subscriber callback. Invoked on the emitting thread, post-lock.
pub type EventHandler = Arc<dyn Fn(&BranchEvent) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<EventHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers run in subscription order.
    pub fn subscribe(&self, handler: EventHandler) {
        self.handlers.write().push(handler);
    }

    /// Deliver `event` to every subscriber, in subscription order.
    ///
    /// The handler list is copied under a short read lock and released
    /// before any handler runs, so handlers can call `subscribe` or `emit`
    /// on this same bus without deadlocking.
    pub fn emit(&self, event: BranchEvent) {
        let handlers: Vec<EventHandler> = self.handlers.read().clone();
        for handler in handlers {
            handler(&event);
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
