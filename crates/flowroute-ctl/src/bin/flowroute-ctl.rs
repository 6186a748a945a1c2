// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flowroute Control CLI
//!
//! Usage:
//!   flowroute-ctl run --node <node.json> [--input <items.json>] [--workflow-id <id>]
//!   flowroute-ctl history count --workflow-id <id> [--node-id <id>] [--scope node|workflow]
//!   flowroute-ctl history clear --workflow-id <id> [--node-id <id>] [--scope node|workflow]
//!   flowroute-ctl schema

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use flowroute_core::Config;
use flowroute_ctl::commands::{
    RunOptions, history_clear, history_count, load_node, open_history, parse_items, run_node,
    scope_key,
};
use flowroute_ctl::logging::load_env_filter;
use flowroute_dsl::DedupScope;
use flowroute_dsl::spec::generate_node_schema;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "flowroute-ctl", version, about = "Run flowroute nodes and manage deduplication history")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one node on a batch of items and print its outputs
    Run {
        /// Node definition (JSON)
        #[arg(long)]
        node: PathBuf,

        /// Input items (JSON array); stdin when omitted or "-"
        #[arg(long)]
        input: Option<PathBuf>,

        /// Workflow the node runs in
        #[arg(long, env = "FLOWROUTE_WORKFLOW_ID", default_value = "default")]
        workflow_id: String,

        /// Override the node id used for node-scoped history
        #[arg(long)]
        node_id: Option<String>,

        /// Recover from item errors instead of failing
        #[arg(long)]
        continue_on_fail: bool,

        /// Keep history in memory only
        #[arg(long)]
        memory: bool,
    },

    /// Inspect or clear deduplication history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Print the JSON schema of node definitions
    Schema,
}

#[derive(Debug, Subcommand)]
enum HistoryAction {
    /// Print the number of remembered values
    Count(ScopeArgs),
    /// Forget every remembered value
    Clear(ScopeArgs),
}

#[derive(Debug, Args)]
struct ScopeArgs {
    #[arg(long, env = "FLOWROUTE_WORKFLOW_ID", default_value = "default")]
    workflow_id: String,

    #[arg(long)]
    node_id: Option<String>,

    #[arg(long, value_enum, default_value_t = ScopeArg::Node)]
    scope: ScopeArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScopeArg {
    Node,
    Workflow,
}

impl From<ScopeArg> for DedupScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Node => DedupScope::Node,
            ScopeArg::Workflow => DedupScope::Workflow,
        }
    }
}

async fn read_input(path: Option<PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("cannot read {}", path.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("cannot read stdin")?;
            Ok(text)
        }
    }
}

fn print(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter, dotenv) = load_env_filter(None);

    // Initialize logging (stderr, so stdout stays JSON)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = dotenv {
        warn!("No .env file loaded: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Schema => print(&generate_node_schema()),
        Command::Run {
            node,
            input,
            workflow_id,
            node_id,
            continue_on_fail,
            memory,
        } => {
            let config = Config::from_env()?;
            let node = load_node(&node)?;
            let items = parse_items(&read_input(input).await?)?;
            let history = open_history(&config, memory).await?;
            let options = RunOptions {
                workflow_id,
                node_id,
                continue_on_fail,
            };
            let result = run_node(&node, items, &options, history, config.history_size).await?;
            print(&result)
        }
        Command::History { action } => {
            let config = Config::from_env()?;
            let history = open_history(&config, false).await?;
            let (args, clear) = match action {
                HistoryAction::Count(args) => (args, false),
                HistoryAction::Clear(args) => (args, true),
            };
            let scope = scope_key(args.scope.into(), &args.workflow_id, args.node_id.as_deref())?;
            let result = if clear {
                history_clear(&history, &scope).await?
            } else {
                history_count(&history, &scope).await?
            };
            print(&result)
        }
    }
}
