// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bfctl health` - print a health snapshot for a freshly constructed manager.

use branchfold_manager::ManagerConfig;

use crate::wiring;

pub async fn run() -> anyhow::Result<()> {
    let manager = wiring::build(ManagerConfig::default());
    let health = manager.health();

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "healthy": health.healthy,
            "active_count": health.active_count,
            "is_shutdown": health.is_shutdown,
        }))?
    );

    Ok(())
}
