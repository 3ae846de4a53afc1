// src/config/validate.rs

use anyhow::{Context, Result, anyhow};
use globset::Glob;

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `debounce_ms >= 1` and `grace_period_ms >= 1`
/// - the configured server command, if present, is not blank
/// - all `[watch].exclude` globs compile
///
/// It does **not** check that the watch root exists; that is resolved (and
/// reported) at startup, after CLI overrides are applied.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_timings(cfg)?;
    validate_command(cfg)?;
    validate_exclude_globs(cfg)?;
    Ok(())
}

fn validate_timings(cfg: &ConfigFile) -> Result<()> {
    if cfg.watch.debounce_ms == 0 {
        return Err(anyhow!("[watch].debounce_ms must be >= 1 (got 0)"));
    }
    if cfg.server.grace_period_ms == 0 {
        return Err(anyhow!("[server].grace_period_ms must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_command(cfg: &ConfigFile) -> Result<()> {
    if let Some(command) = &cfg.server.command {
        if command.trim().is_empty() {
            return Err(anyhow!("[server].command must not be blank"));
        }
    }
    Ok(())
}

fn validate_exclude_globs(cfg: &ConfigFile) -> Result<()> {
    for pat in &cfg.watch.exclude {
        Glob::new(pat)
            .with_context(|| format!("invalid [watch].exclude glob pattern: {pat}"))?;
    }
    Ok(())
}
