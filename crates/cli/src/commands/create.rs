// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bfctl create` - spawn a single root branch and print its handle.

use anyhow::Context;
use branchfold_core::{CallerId, ProjectId, SessionId};
use branchfold_manager::{CreateRequest, ManagerConfig};
use clap::Args;

use crate::wiring;

#[derive(Args)]
pub struct CreateArgs {
    /// Session id the branch belongs to.
    #[arg(long)]
    session: String,

    /// Caller id authorizing the request.
    #[arg(long, default_value = "cli")]
    caller: String,

    /// Opaque project id, passed through unmodified.
    #[arg(long, default_value = "default")]
    project: String,

    /// Short human-readable description of the branch's purpose.
    #[arg(long)]
    description: String,

    /// Prompt text for the branch's isolated sub-context.
    #[arg(long)]
    prompt: String,

    /// Requested token budget (clamped to the manager's configured max).
    #[arg(long)]
    budget: Option<u64>,

    /// Requested timeout in seconds (clamped to the manager's configured max).
    #[arg(long)]
    timeout_seconds: Option<u64>,
}

pub async fn run(args: CreateArgs) -> anyhow::Result<()> {
    let manager = wiring::build(ManagerConfig::default());

    let response = manager
        .create(CreateRequest {
            session_id: SessionId::new(args.session),
            caller_id: CallerId::new(args.caller),
            project_id: ProjectId::new(args.project),
            description: args.description,
            prompt: args.prompt,
            budget: args.budget,
            timeout_seconds: args.timeout_seconds,
            inject_memories: false,
        })
        .await
        .context("create failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "branch_id": response.branch_id.as_str(),
            "depth": response.depth,
            "budget_allocated": response.budget_allocated,
            "injected_memories": response.injected_memories.len(),
        }))?
    );

    Ok(())
}
