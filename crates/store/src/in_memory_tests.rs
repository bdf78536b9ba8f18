// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use branchfold_core::{CallerId, ProjectId};

fn branch(id: &str, session: &str, parent: Option<&str>, depth: u32, created_at_ms: u64, status: BranchStatus) -> Branch {
    Branch {
        id: BranchId::new(id),
        session_id: SessionId::new(session),
        project_id: ProjectId::new("p1"),
        caller_id: CallerId::new("c1"),
        parent_id: parent.map(BranchId::new),
        depth,
        description: "d".into(),
        prompt: "p".into(),
        total_budget: 100,
        used_budget: 0,
        timeout_seconds: 60,
        status,
        result: None,
        error: None,
        injected_memories: Vec::new(),
        created_at_ms,
        completed_at_ms: None,
    }
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let store = InMemoryBranchStore::new();
    let b = branch("b1", "s1", None, 0, 1, BranchStatus::Active);
    store.create(b.clone()).await.unwrap();
    let got = store.get(&BranchId::new("b1")).await.unwrap();
    assert_eq!(got.id, b.id);
}

#[tokio::test]
async fn create_rejects_duplicate_id() {
    let store = InMemoryBranchStore::new();
    let b = branch("b1", "s1", None, 0, 1, BranchStatus::Active);
    store.create(b.clone()).await.unwrap();
    let err = store.create(b).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));
}

#[tokio::test]
async fn get_missing_branch_errors() {
    let store = InMemoryBranchStore::new();
    let err = store.get(&BranchId::new("missing")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn update_rejects_missing_id() {
    let store = InMemoryBranchStore::new();
    let b = branch("b1", "s1", None, 0, 1, BranchStatus::Active);
    let err = store.update(b).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn update_overwrites_whole_record() {
    let store = InMemoryBranchStore::new();
    let mut b = branch("b1", "s1", None, 0, 1, BranchStatus::Active);
    store.create(b.clone()).await.unwrap();
    b.status = BranchStatus::Completed;
    b.result = Some("done".into());
    store.update(b).await.unwrap();
    let got = store.get(&BranchId::new("b1")).await.unwrap();
    assert_eq!(got.status, BranchStatus::Completed);
    assert_eq!(got.result.as_deref(), Some("done"));
}

#[tokio::test]
async fn delete_removes_from_indices() {
    let store = InMemoryBranchStore::new();
    let b = branch("b1", "s1", Some("parent"), 1, 1, BranchStatus::Active);
    store.create(b).await.unwrap();
    store.delete(&BranchId::new("b1")).await.unwrap();
    assert!(store.get(&BranchId::new("b1")).await.is_err());
    assert!(store.list_by_session(&SessionId::new("s1")).await.is_empty());
    assert!(store.list_by_parent(&BranchId::new("parent")).await.is_empty());
}

#[tokio::test]
async fn list_by_session_returns_independent_copies() {
    let store = InMemoryBranchStore::new();
    let b = branch("b1", "s1", None, 0, 1, BranchStatus::Active);
    store.create(b).await.unwrap();

    let mut listed = store.list_by_session(&SessionId::new("s1")).await;
    listed[0].description = "mutated".into();

    let fetched = store.get(&BranchId::new("b1")).await.unwrap();
    assert_eq!(fetched.description, "d");
}

#[tokio::test]
async fn get_active_by_session_prefers_deepest() {
    let store = InMemoryBranchStore::new();
    store
        .create(branch("b1", "s1", None, 0, 1, BranchStatus::Active))
        .await
        .unwrap();
    store
        .create(branch("b2", "s1", Some("b1"), 1, 2, BranchStatus::Active))
        .await
        .unwrap();

    let active = store.get_active_by_session(&SessionId::new("s1")).await.unwrap();
    assert_eq!(active.id, BranchId::new("b2"));
}

#[tokio::test]
async fn get_active_by_session_breaks_ties_by_recency() {
    let store = InMemoryBranchStore::new();
    store
        .create(branch("b1", "s1", None, 0, 1, BranchStatus::Active))
        .await
        .unwrap();
    store
        .create(branch("b2", "s1", None, 0, 5, BranchStatus::Active))
        .await
        .unwrap();

    let active = store.get_active_by_session(&SessionId::new("s1")).await.unwrap();
    assert_eq!(active.id, BranchId::new("b2"));
}

#[tokio::test]
async fn get_active_by_session_ignores_terminal_branches() {
    let store = InMemoryBranchStore::new();
    store
        .create(branch("b1", "s1", None, 0, 1, BranchStatus::Completed))
        .await
        .unwrap();

    assert!(store.get_active_by_session(&SessionId::new("s1")).await.is_none());
}

#[tokio::test]
async fn count_active_by_session_ignores_terminal_branches() {
    let store = InMemoryBranchStore::new();
    store
        .create(branch("b1", "s1", None, 0, 1, BranchStatus::Active))
        .await
        .unwrap();
    store
        .create(branch("b2", "s1", None, 0, 2, BranchStatus::Completed))
        .await
        .unwrap();

    assert_eq!(store.count_active_by_session(&SessionId::new("s1")).await, 1);
}

#[tokio::test]
async fn complete_if_active_transitions_and_returns_the_updated_snapshot() {
    let store = InMemoryBranchStore::new();
    store
        .create(branch("b1", "s1", None, 0, 1, BranchStatus::Active))
        .await
        .unwrap();

    let won = store
        .complete_if_active(&BranchId::new("b1"), "done".into(), 10, 100)
        .await
        .unwrap();

    let branch = won.expect("an active branch must be claimed");
    assert_eq!(branch.status, BranchStatus::Completed);
    assert_eq!(branch.result.as_deref(), Some("done"));
    assert_eq!(branch.used_budget, 10);
}

#[tokio::test]
async fn complete_if_active_is_none_for_an_already_terminal_branch() {
    let store = InMemoryBranchStore::new();
    store
        .create(branch("b1", "s1", None, 0, 1, BranchStatus::Completed))
        .await
        .unwrap();

    let won = store
        .complete_if_active(&BranchId::new("b1"), "done".into(), 10, 100)
        .await
        .unwrap();

    assert!(won.is_none());
}

#[tokio::test]
async fn complete_if_active_errors_on_a_missing_branch() {
    let store = InMemoryBranchStore::new();
    let err = store
        .complete_if_active(&BranchId::new("missing"), "done".into(), 10, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn only_one_of_two_concurrent_force_terminal_claims_wins() {
    let store = InMemoryBranchStore::new();
    store
        .create(branch("b1", "s1", None, 0, 1, BranchStatus::Active))
        .await
        .unwrap();

    let first = store
        .force_terminal_if_active(&BranchId::new("b1"), BranchStatus::Timeout, "timeout exceeded".into(), 5, 100)
        .await
        .unwrap();
    let second = store
        .force_terminal_if_active(&BranchId::new("b1"), BranchStatus::Failed, "parent returning".into(), 5, 101)
        .await
        .unwrap();

    assert!(first.is_some(), "the first claim on an active branch must win");
    assert!(second.is_none(), "a second claim on an already-terminal branch must be a no-op");
    assert_eq!(first.unwrap().status, BranchStatus::Timeout);
}
