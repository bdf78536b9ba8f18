// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex as PMutex;
use std::sync::Arc as StdArc;

#[tokio::test(start_paused = true)]
async fn fires_timeout_event_after_duration_elapses() {
    let bus = Arc::new(EventBus::new());
    let fired = StdArc::new(PMutex::new(false));
    let fired_clone = fired.clone();
    bus.subscribe(StdArc::new(move |event| {
        if matches!(event, BranchEvent::Timeout { .. }) {
            *fired_clone.lock() = true;
        }
    }));

    let _handle = spawn(BranchId::new("b1"), 1, bus);
    tokio::time::advance(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;

    assert!(*fired.lock());
}

#[tokio::test(start_paused = true)]
async fn cancelling_before_it_fires_suppresses_the_event() {
    let bus = Arc::new(EventBus::new());
    let fired = StdArc::new(PMutex::new(false));
    let fired_clone = fired.clone();
    bus.subscribe(StdArc::new(move |event| {
        if matches!(event, BranchEvent::Timeout { .. }) {
            *fired_clone.lock() = true;
        }
    }));

    let handle = spawn(BranchId::new("b1"), 10, bus);
    handle.cancel();
    tokio::time::advance(Duration::from_secs(20)).await;
    tokio::task::yield_now().await;

    assert!(!*fired.lock());
}

#[tokio::test(start_paused = true)]
async fn cancelling_twice_is_a_no_op() {
    let bus = Arc::new(EventBus::new());
    let handle = spawn(BranchId::new("b1"), 10, bus);
    handle.cancel();
    handle.cancel();
}

#[tokio::test(start_paused = true)]
async fn cancelling_after_it_fired_is_a_no_op() {
    let bus = Arc::new(EventBus::new());
    let handle = spawn(BranchId::new("b1"), 1, bus);
    tokio::time::advance(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;
    handle.cancel();
}
