// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured error taxonomy for the branch manager and its collaborators.
//!
//! Errors are categorized by kind, not by source exception type, so that any
//! surface wrapping the core can map them onto its own status codes without
//! matching on message text.

use thiserror::Error;

/// The broad category a [`BranchError`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Lifecycle,
    Capacity,
    Authorization,
    System,
}

/// Errors produced by the branch manager and the collaborators it drives.
#[derive(Debug, Error)]
pub enum BranchError {
    #[error("session id must not be empty")]
    EmptySessionId,
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("description exceeds maximum length of {max}")]
    DescriptionTooLong { max: usize },
    #[error("prompt must not be empty")]
    EmptyPrompt,
    #[error("prompt exceeds maximum length of {max}")]
    PromptTooLong { max: usize },
    #[error("branch id must not be empty")]
    EmptyBranchId,
    #[error("return message exceeds maximum length of {max}")]
    MessageTooLong { max: usize },
    #[error("invalid budget: {0}")]
    InvalidBudget(String),
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("branch not found: {0}")]
    BranchNotFound(String),
    #[error("branch already exists: {0}")]
    BranchAlreadyExists(String),
    #[error("branch {0} is not active")]
    BranchNotActive(String),
    #[error("maximum branch depth exceeded: {depth} >= {max}")]
    MaxDepthExceeded { depth: u32, max: u32 },
    #[error("branch {0} has active child branches")]
    ActiveChildBranches(String),

    #[error("rate limit exceeded for session {0}")]
    RateLimitExceeded(String),
    #[error("maximum concurrent branches exceeded")]
    MaxConcurrentBranches,
    #[error("budget exhausted for branch {0}")]
    BudgetExhausted(String),
    #[error("budget overflow for branch {0}")]
    BudgetOverflow(String),

    #[error("session {session} is not authorized for caller {caller}")]
    SessionUnauthorized { session: String, caller: String },

    #[error("failed to scrub return message: {0}")]
    ScrubbingFailed(String),
    #[error("no budget record for branch {0}")]
    BudgetNotFound(String),
    #[error("manager is shut down")]
    ShuttingDown,
}

impl BranchError {
    /// The broad category this error falls into.
    pub fn kind(&self) -> ErrorKind {
        use BranchError::*;
        match self {
            EmptySessionId
            | EmptyDescription
            | DescriptionTooLong { .. }
            | EmptyPrompt
            | PromptTooLong { .. }
            | EmptyBranchId
            | MessageTooLong { .. }
            | InvalidBudget(_)
            | InvalidTransition { .. } => ErrorKind::Validation,

            BranchNotFound(_)
            | BranchAlreadyExists(_)
            | BranchNotActive(_)
            | MaxDepthExceeded { .. }
            | ActiveChildBranches(_) => ErrorKind::Lifecycle,

            RateLimitExceeded(_) | MaxConcurrentBranches | BudgetExhausted(_) | BudgetOverflow(_) => {
                ErrorKind::Capacity
            }

            SessionUnauthorized { .. } => ErrorKind::Authorization,

            ScrubbingFailed(_) | BudgetNotFound(_) | ShuttingDown => ErrorKind::System,
        }
    }

    /// Whether a caller may reasonably retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BranchError::RateLimitExceeded(_)
                | BranchError::MaxConcurrentBranches
                | BranchError::BudgetExhausted(_)
        )
    }

    /// Whether this error represents a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BranchError::BranchNotFound(_) | BranchError::BudgetNotFound(_))
    }

    /// Validation failures and lifecycle misuse -- the caller did something
    /// the contract forbids.
    pub fn is_user_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Lifecycle)
    }

    /// System-level failure: a collaborator misbehaved or refused fail-open.
    pub fn is_system_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::System)
    }

    /// Whether the caller was rejected by the session validator.
    pub fn is_authorization_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Authorization)
    }
}

pub type BranchResult<T> = Result<T, BranchError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
