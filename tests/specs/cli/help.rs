//! CLI help/usage specs.

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_nonzero() {
    cli().fails();
}

#[test]
fn help_shows_usage() {
    cli().args(["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn create_help_shows_usage() {
    cli().args(["create", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn demo_help_shows_usage() {
    cli().args(["demo", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn version_shows_version() {
    cli().args(["--version"]).passes().stdout_has("0.1");
}
