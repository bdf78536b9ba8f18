// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strict session validator for multi-tenant deployments.

use async_trait::async_trait;

use super::{SessionValidator, ValidationError};

/// Allows iff `session_id == caller_id` or `session_id` begins with
/// `caller_id + "_"`. Rejects an empty caller id outright.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictValidator;

impl StrictValidator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionValidator for StrictValidator {
    async fn validate_session(&self, session_id: &str, caller_id: &str) -> Result<(), ValidationError> {
        let unauthorized = || ValidationError::Unauthorized {
            session: session_id.to_string(),
            caller: caller_id.to_string(),
        };

        if caller_id.is_empty() {
            return Err(unauthorized());
        }

        let prefix = format!("{caller_id}_");
        if session_id == caller_id || session_id.starts_with(&prefix) {
            Ok(())
        } else {
            Err(unauthorized())
        }
    }
}

#[cfg(test)]
#[path = "strict_tests.rs"]
mod tests;
