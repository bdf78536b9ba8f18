// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn always_fails() {
    let scrubber = NoOpScrubber::new();
    assert!(scrubber.scrub("hello").await.is_err());
}
