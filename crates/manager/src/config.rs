// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager configuration: defaults and clamps applied to every branch
//! request.

/// Tunables read by the branch manager. All fields carry the reference
/// defaults; construct via `ManagerConfig::default()` and override selected
/// fields with struct-update syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    /// Budget used when a `Create` request omits one.
    pub default_budget: u64,
    /// Upper clamp for any requested budget.
    pub max_budget: u64,
    /// `Create` is rejected at depth >= this.
    pub max_depth: u32,
    /// Timeout used when a `Create` request omits one.
    pub default_timeout_seconds: u64,
    /// Upper clamp for any requested timeout.
    pub max_timeout_seconds: u64,
    /// Reserved portion of budget for memory injection.
    pub injection_budget_ratio: f64,
    /// Floor confidence for injected memories.
    pub memory_min_confidence: f64,
    /// Max items injected per branch.
    pub memory_max_items: usize,
    /// Hard cap on concurrently active branches per session.
    pub max_concurrent_per_session: usize,
    /// Hard cap on concurrently active branches process-wide.
    pub max_concurrent_per_instance: usize,
    /// Max description length.
    pub max_description_len: usize,
    /// Max prompt length.
    pub max_prompt_len: usize,
    /// Max return-message length.
    pub max_message_len: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_budget: 8_192,
            max_budget: 32_768,
            max_depth: 3,
            default_timeout_seconds: 300,
            max_timeout_seconds: 600,
            injection_budget_ratio: 0.2,
            memory_min_confidence: 0.7,
            memory_max_items: 10,
            max_concurrent_per_session: 10,
            max_concurrent_per_instance: 100,
            max_description_len: 500,
            max_prompt_len: 10_000,
            max_message_len: 50_000,
        }
    }
}

impl ManagerConfig {
    /// Clamp a requested budget into `[1, max_budget]`, substituting
    /// `default_budget` when `requested` is `None`.
    pub fn clamp_budget(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default_budget).clamp(1, self.max_budget)
    }

    /// Clamp a requested timeout into `[1, max_timeout_seconds]`,
    /// substituting `default_timeout_seconds` when `requested` is `None`.
    pub fn clamp_timeout(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_timeout_seconds)
            .clamp(1, self.max_timeout_seconds)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
