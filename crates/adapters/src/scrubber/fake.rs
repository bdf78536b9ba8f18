// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake secret scrubber for testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ScrubError, SecretScrubber};

struct FakeScrubberState {
    calls: Vec<String>,
    fail: bool,
}

/// Records every call and either echoes the text back or always fails,
/// depending on `fail_next`.
#[derive(Clone)]
pub struct FakeScrubber {
    inner: Arc<Mutex<FakeScrubberState>>,
}

impl Default for FakeScrubber {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeScrubberState {
                calls: Vec::new(),
                fail: false,
            })),
        }
    }
}

impl FakeScrubber {
    pub fn new() -> Self {
        Self::default()
    }

    /// After this call, every subsequent `scrub` returns an error.
    pub fn fail_next(&self) {
        self.inner.lock().fail = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl SecretScrubber for FakeScrubber {
    async fn scrub(&self, text: &str) -> Result<String, ScrubError> {
        let mut inner = self.inner.lock();
        inner.calls.push(text.to_string());
        if inner.fail {
            return Err(ScrubError::Failed("fake scrubber configured to fail".into()));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
