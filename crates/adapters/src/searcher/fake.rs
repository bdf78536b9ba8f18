// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake memory searcher for testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{MemoryItem, MemorySearcher, SearchError};

struct FakeMemorySearcherState {
    items: Vec<MemoryItem>,
    calls: Vec<(String, usize, f64)>,
}

/// Returns a preconfigured, caller-supplied list of items (already filtered
/// and ordered by the test), ignoring `limit` and `min_confidence` unless
/// the test pre-trims the list itself.
#[derive(Clone)]
pub struct FakeMemorySearcher {
    inner: Arc<Mutex<FakeMemorySearcherState>>,
}

impl Default for FakeMemorySearcher {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeMemorySearcherState {
                items: Vec::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeMemorySearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<MemoryItem>) -> Self {
        let searcher = Self::new();
        searcher.inner.lock().items = items;
        searcher
    }

    pub fn calls(&self) -> Vec<(String, usize, f64)> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl MemorySearcher for FakeMemorySearcher {
    async fn search(&self, query: &str, limit: usize, min_confidence: f64) -> Result<Vec<MemoryItem>, SearchError> {
        let mut inner = self.inner.lock();
        inner.calls.push((query.to_string(), limit, min_confidence));
        Ok(inner.items.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
