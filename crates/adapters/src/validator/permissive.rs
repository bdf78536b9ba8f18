// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permissive session validator for single-tenant deployments.

use async_trait::async_trait;

use super::{SessionValidator, ValidationError};

/// Always allows. Used for single-tenant deployments where session and
/// caller identity are not distinguished.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissiveValidator;

impl PermissiveValidator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionValidator for PermissiveValidator {
    async fn validate_session(&self, _session_id: &str, _caller_id: &str) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "permissive_tests.rs"]
mod tests;
