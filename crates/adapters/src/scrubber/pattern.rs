// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Regex-pattern-based secret scrubber.

use async_trait::async_trait;
use regex::Regex;

use super::{ScrubError, SecretScrubber};

const REDACTED: &str = "[REDACTED]";

/// Redacts a fixed set of common secret shapes: AWS access keys, bearer
/// tokens, and PEM private key blocks. Not a substitute for a dedicated
/// secret-detection engine -- this is the reference implementation the core
/// ships with when no richer scrubber is wired in.
pub struct PatternScrubber {
    patterns: Vec<Regex>,
}

impl PatternScrubber {
    pub fn new() -> Self {
        let patterns = [
            r"AKIA[0-9A-Z]{16}",
            r"(?i)bearer\s+[a-z0-9._-]{10,}",
            r"-----BEGIN [A-Z ]+PRIVATE KEY-----[\s\S]*?-----END [A-Z ]+PRIVATE KEY-----",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("built-in scrub pattern must compile"))
        .collect();

        Self { patterns }
    }

    /// Build a scrubber from caller-supplied patterns, e.g. to extend the
    /// default set with project-specific secret shapes.
    pub fn with_patterns(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }
}

impl Default for PatternScrubber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretScrubber for PatternScrubber {
    async fn scrub(&self, text: &str) -> Result<String, ScrubError> {
        let mut scrubbed = text.to_string();
        for pattern in &self.patterns {
            scrubbed = pattern.replace_all(&scrubbed, REDACTED).into_owned();
        }
        Ok(scrubbed)
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
