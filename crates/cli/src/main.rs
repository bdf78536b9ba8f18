// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bfctl - demo CLI for the context-folding branch manager.
//!
//! Each invocation wires a fresh [`BranchManager`] to in-memory adapters:
//! branches are not persisted across process restarts, so `bfctl` cannot be
//! a thin client driving state held by some other long-lived process.
//! `create` and `health` are meaningful standalone invocations; `demo`
//! drives the full create -> consume -> return lifecycle in one process so
//! the cascade, scrubbing, and budget paths are all observable from the
//! command line.

mod commands;
mod wiring;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bfctl", version, about = "Context-folding branch manager demo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a single root branch and print the allocated handle.
    Create(commands::create::CreateArgs),
    /// Print a health snapshot for a freshly constructed manager.
    Health,
    /// Run the full create/consume/return/cascade lifecycle in one process.
    Demo(commands::demo::DemoArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Create(args) => commands::create::run(args).await,
        Commands::Health => commands::health::run().await,
        Commands::Demo(args) => commands::demo::run(args).await,
    }
}
