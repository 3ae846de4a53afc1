// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `devloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devloop",
    version,
    about = "Watch a directory tree and restart a dev server on changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Devloop.toml` in the current working directory. A missing
    /// file at the default path is fine; built-in defaults apply.
    #[arg(long, value_name = "PATH", default_value = "Devloop.toml")]
    pub config: String,

    /// Root directory to watch (overrides `[watch].root`).
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVLOOP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the effective settings, but don't watch or execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Server command to run and restart (overrides `[server].command`).
    ///
    /// Use `--` before commands that take flags of their own, e.g.
    /// `devloop -- python3 -m http.server 8080`.
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
