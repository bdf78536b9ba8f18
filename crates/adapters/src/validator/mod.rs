// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session authorization adapters.

mod permissive;
mod strict;

pub use permissive::PermissiveValidator;
pub use strict::StrictValidator;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("session {session} is not authorized for caller {caller}")]
    Unauthorized { session: String, caller: String },
}

/// Authorizes a caller against a session before it may act on that
/// session's branches.
///
/// Evaluated on `Create` and on a user-initiated `Return`. Force-return
/// triggered internally by events (budget exhaustion, timeout, cascade) is
/// not a user action and bypasses the validator.
#[async_trait]
pub trait SessionValidator: Send + Sync + 'static {
    async fn validate_session(&self, session_id: &str, caller_id: &str) -> Result<(), ValidationError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
