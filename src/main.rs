use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slicestore::demo::demo_store;
use slicestore::logging::init_tracing;
use slicestore::{Action, Config, Reducer};

#[derive(Parser)]
#[command(name = "slicestore")]
#[command(about = "Replay actions through the demo state store")]
#[command(version)]
struct Cli {
    /// Config file (default: <config_dir>/slicestore/config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch every action in a JSON-lines file and print the final state
    Replay {
        /// One `{"type": ..., "payload": ...}` object per line; `#` starts a comment
        file: PathBuf,

        /// Pretty-print the resulting state
        #[arg(long)]
        pretty: bool,
    },

    /// List the action types owned by the demo store
    Actions,
}

fn main() -> ExitCode {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    init_tracing(&config.logging.filter);

    let store = demo_store(config.store).context("Failed to build demo store")?;

    match cli.command {
        Commands::Replay { file, pretty } => {
            let actions = read_actions(&file)?;
            let notifications = Arc::new(AtomicUsize::new(0));
            let subscription = {
                let notifications = Arc::clone(&notifications);
                store.subscribe(move || {
                    notifications.fetch_add(1, Ordering::Relaxed);
                })
            };

            for (line, action) in &actions {
                store
                    .dispatch(action.clone())
                    .with_context(|| format!("{}:{}: dispatch failed", file.display(), line))?;
            }
            subscription.unsubscribe();

            tracing::info!(
                dispatched = actions.len(),
                notifications = notifications.load(Ordering::Relaxed),
                version = store.version(),
                "Replay finished"
            );

            let state = store.read();
            let output = if pretty {
                serde_json::to_string_pretty(&*state)?
            } else {
                serde_json::to_string(&*state)?
            };
            println!("{output}");
        }
        Commands::Actions => {
            for action_type in store.reducer().action_types() {
                println!("{action_type}");
            }
        }
    }

    Ok(())
}

/// Parses a JSON-lines action file, keeping 1-based line numbers.
fn read_actions(path: &Path) -> Result<Vec<(usize, Action)>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read actions from '{}'", path.display()))?;
    parse_actions(&content).with_context(|| format!("Invalid action file '{}'", path.display()))
}

fn parse_actions(content: &str) -> Result<Vec<(usize, Action)>> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str::<Action>(line)
                .map(|action| (number, action))
                .with_context(|| format!("line {number}: not an action"))
        })
        .collect()
}
