//! `bfctl create` behavioral specs.

use crate::prelude::*;

#[test]
fn root_branch_has_depth_zero_and_the_default_budget() {
    let result = cli()
        .args([
            "create",
            "--session",
            "s1",
            "--description",
            "look up config",
            "--prompt",
            "find the config value",
        ])
        .passes();
    let value = result.json();
    assert_eq!(value["depth"], 0);
    assert_eq!(value["budget_allocated"], 8_192);
}

#[test]
fn an_oversized_requested_budget_is_clamped_to_the_configured_max() {
    let result = cli()
        .args([
            "create",
            "--session",
            "s1",
            "--description",
            "d",
            "--prompt",
            "p",
            "--budget",
            "999999999",
        ])
        .passes();
    assert_eq!(result.json()["budget_allocated"], 32_768);
}

#[test]
fn empty_description_is_rejected() {
    cli()
        .args(["create", "--session", "s1", "--description", "", "--prompt", "p"])
        .fails();
}

#[test]
fn empty_session_id_is_rejected() {
    cli()
        .args(["create", "--session", "", "--description", "d", "--prompt", "p"])
        .fails();
}
