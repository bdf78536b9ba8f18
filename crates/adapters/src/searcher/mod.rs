// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory-injection search adapters.

mod noop;

pub use noop::NoOpMemorySearcher;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMemorySearcher;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search failed: {0}")]
    Failed(String),
}

/// A candidate memory item available for injection into a new branch.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tokens: u64,
}

/// Optional collaborator consulted when a branch request opts into memory
/// injection. Return order is preserved; the manager consumes tokens per
/// item in order until the budget is exhausted.
#[async_trait]
pub trait MemorySearcher: Send + Sync + 'static {
    async fn search(&self, query: &str, limit: usize, min_confidence: f64) -> Result<Vec<MemoryItem>, SearchError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
