// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret-scrubbing adapters.

mod noop;
mod pattern;

pub use noop::NoOpScrubber;
pub use pattern::PatternScrubber;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeScrubber;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a scrub operation.
#[derive(Debug, Error)]
pub enum ScrubError {
    #[error("scrub failed: {0}")]
    Failed(String),
}

/// Redacts secrets from text before it leaves a branch.
///
/// The manager fails closed on any `Err` from this trait, and also fails
/// closed when no scrubber is configured at all -- there is deliberately no
/// "pass through unscrubbed" implementation in this module.
#[async_trait]
pub trait SecretScrubber: Send + Sync + 'static {
    async fn scrub(&self, text: &str) -> Result<String, ScrubError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
