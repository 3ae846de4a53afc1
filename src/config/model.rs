// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// This is a direct mapping of `Devloop.toml`:
///
/// ```toml
/// [server]
/// command = "python3 -m http.server 8080"
/// grace_period_ms = 5000
///
/// [watch]
/// root = "."
/// exclude_dirs = ["vendor"]
/// exclude = ["**/*.swp"]
/// debounce_ms = 200
/// ```
///
/// All sections are optional and have reasonable defaults. The server
/// command may instead be supplied on the command line, which takes
/// precedence over this file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Managed server process settings from `[server]`.
    #[serde(default)]
    pub server: ServerSection,

    /// Watch tree settings from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Command line for the managed server process, run through the
    /// platform shell. If `None`, the command must come from the CLI.
    #[serde(default)]
    pub command: Option<String>,

    /// How long a stopped server gets to exit on its own before a forced
    /// kill is issued, in milliseconds.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

fn default_grace_period_ms() -> u64 {
    crate::exec::GRACE_PERIOD.as_millis() as u64
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            command: None,
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Root directory of the watched tree.
    #[serde(default = "default_root")]
    pub root: String,

    /// Extra directory names to exclude, appended to the built-in
    /// denylist (`.git`, `node_modules`, `target`, ...).
    #[serde(default)]
    pub exclude_dirs: Vec<String>,

    /// Glob patterns (relative to the root) whose matches never trigger a
    /// restart and are never watched.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Quiet interval for coalescing change bursts into one restart, in
    /// milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_root() -> String {
    ".".to_string()
}

fn default_debounce_ms() -> u64 {
    crate::engine::DEBOUNCE_WINDOW.as_millis() as u64
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude_dirs: Vec::new(),
            exclude: Vec::new(),
            debounce_ms: default_debounce_ms(),
        }
    }
}
