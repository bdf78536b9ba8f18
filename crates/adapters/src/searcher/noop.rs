// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op memory searcher for deployments without a memory store.

use async_trait::async_trait;

use super::{MemoryItem, MemorySearcher, SearchError};

/// Always returns no results. Used when memory injection is disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMemorySearcher;

impl NoOpMemorySearcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MemorySearcher for NoOpMemorySearcher {
    async fn search(&self, _query: &str, _limit: usize, _min_confidence: f64) -> Result<Vec<MemoryItem>, SearchError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
