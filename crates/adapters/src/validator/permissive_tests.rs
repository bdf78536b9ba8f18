// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn allows_any_session_caller_pairing() {
    let validator = PermissiveValidator::new();
    assert!(validator.validate_session("s1", "c1").await.is_ok());
    assert!(validator.validate_session("", "").await.is_ok());
}
