// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_optional;
use crate::config::model::ConfigFile;
use crate::engine::{Debouncer, Supervisor, SupervisorEvent};
use crate::exec::{ServerCommand, ServerProcess};
use crate::watch::{DEFAULT_EXCLUDED_DIRS, PathFilter, spawn_watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (with CLI overrides)
/// - the filesystem watcher
/// - the managed server process
/// - SIGINT/SIGTERM handling
/// - the supervisor event loop
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_optional(&config_path)?;

    let command_line = server_command_line(&args, &cfg, &config_path)?;
    let root = watch_root(&args, &cfg);

    if args.dry_run {
        print_dry_run(&cfg, &command_line, &root);
        return Ok(());
    }

    let filter = PathFilter::new(root.clone(), &cfg.watch.exclude_dirs, &cfg.watch.exclude)?;

    // Supervisor event channel: watcher pump + signal listener feed it.
    let (events_tx, events_rx) = mpsc::channel::<SupervisorEvent>(64);

    let watcher = spawn_watcher(root.clone(), filter, events_tx.clone())?;
    spawn_signal_listener(events_tx);

    let server = ServerProcess::new(
        ServerCommand::new(command_line),
        Duration::from_millis(cfg.server.grace_period_ms),
    );
    let debouncer = Debouncer::new(Duration::from_millis(cfg.watch.debounce_ms));

    info!(root = ?root, "watching for file changes; press Ctrl+C to stop");

    let supervisor = Supervisor::new(root, server, debouncer, events_rx, Some(watcher));
    supervisor.run().await
}

/// Effective server command: trailing CLI words win over `[server].command`.
fn server_command_line(args: &CliArgs, cfg: &ConfigFile, config_path: &Path) -> Result<String> {
    if !args.command.is_empty() {
        return Ok(args.command.join(" "));
    }

    cfg.server.command.clone().ok_or_else(|| {
        anyhow!(
            "no server command configured; pass one on the command line \
             or set [server].command in {:?}",
            config_path
        )
    })
}

/// Effective watch root: `--root` wins over `[watch].root`; canonicalized
/// best-effort so excluded-path checks compare like with like.
fn watch_root(args: &CliArgs, cfg: &ConfigFile) -> PathBuf {
    let root = PathBuf::from(args.root.as_ref().unwrap_or(&cfg.watch.root));
    root.canonicalize().unwrap_or(root)
}

/// SIGINT and SIGTERM both request the same orderly shutdown.
fn spawn_signal_listener(events_tx: mpsc::Sender<SupervisorEvent>) {
    tokio::spawn(async move {
        let interrupted = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {err}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let terminated = async {
                match signal(SignalKind::terminate()) {
                    Ok(mut term) => {
                        term.recv().await;
                    }
                    Err(err) => {
                        eprintln!("failed to listen for SIGTERM: {err}");
                        std::future::pending::<()>().await;
                    }
                }
            };

            tokio::select! {
                _ = interrupted => {}
                _ = terminated => {}
            }
        }

        #[cfg(not(unix))]
        interrupted.await;

        let _ = events_tx.send(SupervisorEvent::ShutdownRequested).await;
    });
}

/// Simple dry-run output: print the effective settings.
fn print_dry_run(cfg: &ConfigFile, command_line: &str, root: &Path) {
    println!("devloop dry-run");
    println!("  server.command = {command_line}");
    println!("  server.grace_period_ms = {}", cfg.server.grace_period_ms);
    println!("  watch.root = {}", root.display());
    println!("  watch.debounce_ms = {}", cfg.watch.debounce_ms);
    if !cfg.watch.exclude_dirs.is_empty() {
        println!("  watch.exclude_dirs = {:?}", cfg.watch.exclude_dirs);
    }
    if !cfg.watch.exclude.is_empty() {
        println!("  watch.exclude = {:?}", cfg.watch.exclude);
    }
    println!("  built-in excluded dirs = {:?}", DEFAULT_EXCLUDED_DIRS);
}
