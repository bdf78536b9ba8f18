// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_branch() -> Branch {
    Branch {
        id: BranchId::new("b1"),
        session_id: SessionId::new("s1"),
        project_id: ProjectId::new("p1"),
        caller_id: CallerId::new("c1"),
        parent_id: None,
        depth: 0,
        description: "look up config".into(),
        prompt: "find the config value".into(),
        total_budget: 4096,
        used_budget: 0,
        timeout_seconds: 300,
        status: BranchStatus::Active,
        result: None,
        error: None,
        injected_memories: Vec::new(),
        created_at_ms: 1_000,
        completed_at_ms: None,
    }
}

#[test]
fn active_can_transition_to_any_terminal_state() {
    assert!(BranchStatus::Active.can_transition_to(&BranchStatus::Completed));
    assert!(BranchStatus::Active.can_transition_to(&BranchStatus::Timeout));
    assert!(BranchStatus::Active.can_transition_to(&BranchStatus::Failed));
}

#[test]
fn terminal_states_accept_no_further_transition() {
    for terminal in [BranchStatus::Completed, BranchStatus::Timeout, BranchStatus::Failed] {
        for next in [BranchStatus::Active, BranchStatus::Completed, BranchStatus::Timeout, BranchStatus::Failed] {
            assert!(!terminal.can_transition_to(&next));
        }
    }
}

#[test]
fn is_terminal_matches_the_three_terminal_variants() {
    assert!(!BranchStatus::Created.is_terminal());
    assert!(!BranchStatus::Active.is_terminal());
    assert!(BranchStatus::Completed.is_terminal());
    assert!(BranchStatus::Timeout.is_terminal());
    assert!(BranchStatus::Failed.is_terminal());
}

#[test]
fn complete_sets_result_and_completed_at() {
    let mut branch = sample_branch();
    branch.complete("done".into(), 128, 2_000);
    assert_eq!(branch.status, BranchStatus::Completed);
    assert_eq!(branch.result.as_deref(), Some("done"));
    assert_eq!(branch.error, None);
    assert_eq!(branch.used_budget, 128);
    assert_eq!(branch.completed_at_ms, Some(2_000));
}

#[test]
fn force_terminal_records_reason_as_error() {
    let mut branch = sample_branch();
    branch.force_terminal(BranchStatus::Timeout, "timeout exceeded", 64, 3_000);
    assert_eq!(branch.status, BranchStatus::Timeout);
    assert_eq!(branch.error.as_deref(), Some("timeout exceeded"));
    assert_eq!(branch.result, None);
    assert_eq!(branch.completed_at_ms, Some(3_000));
}

#[test]
fn display_renders_lowercase_snake_ish_names() {
    assert_eq!(BranchStatus::Created.to_string(), "created");
    assert_eq!(BranchStatus::Active.to_string(), "active");
    assert_eq!(BranchStatus::Completed.to_string(), "completed");
    assert_eq!(BranchStatus::Timeout.to_string(), "timeout");
    assert_eq!(BranchStatus::Failed.to_string(), "failed");
}
