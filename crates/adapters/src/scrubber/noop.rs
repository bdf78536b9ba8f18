// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fail-closed stand-in for "no scrubber configured".

use async_trait::async_trait;

use super::{ScrubError, SecretScrubber};

/// Always fails. Exists so the manager can hold a concrete
/// `Arc<dyn SecretScrubber>` rather than an `Option`, while still honoring
/// "fail closed when absent": wiring this adapter in is equivalent to
/// having no scrubber at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpScrubber;

impl NoOpScrubber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecretScrubber for NoOpScrubber {
    async fn scrub(&self, _text: &str) -> Result<String, ScrubError> {
        Err(ScrubError::Failed("no scrubber configured".into()))
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
