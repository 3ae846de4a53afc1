// src/watch/exclude.rs

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Directory names that are never watched and never trigger restarts:
/// source-control metadata, dependency trees, and build output.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", ".hg", ".svn", "node_modules", "target"];

/// Decides whether a path belongs to the watched tree.
///
/// A path is excluded when:
/// - it does not normalize to somewhere under the root, or
/// - any of its root-relative components is a denylisted directory name, or
/// - its root-relative form matches a user-supplied exclude glob.
///
/// The root itself is never excluded.
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    names: HashSet<String>,
    globs: Option<GlobSet>,
}

impl PathFilter {
    /// Build a filter rooted at `root`.
    ///
    /// `extra_names` is appended to [`DEFAULT_EXCLUDED_DIRS`];
    /// `glob_patterns` are compiled into a single `GlobSet` matched against
    /// root-relative paths with forward slashes.
    pub fn new(root: PathBuf, extra_names: &[String], glob_patterns: &[String]) -> Result<Self> {
        let mut names: HashSet<String> = DEFAULT_EXCLUDED_DIRS
            .iter()
            .map(|s| s.to_string())
            .collect();
        names.extend(extra_names.iter().cloned());

        let globs = if glob_patterns.is_empty() {
            None
        } else {
            Some(build_globset(glob_patterns)?)
        };

        Ok(Self { root, names, globs })
    }

    /// Root directory this filter is anchored at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if `path` must be ignored by the watcher.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            // Outside the root entirely.
            return true;
        };

        for component in rel.components() {
            match component {
                Component::ParentDir => return true,
                Component::Normal(name) => {
                    if self.names.contains(name.to_string_lossy().as_ref()) {
                        return true;
                    }
                }
                _ => {}
            }
        }

        if let Some(globs) = &self.globs {
            let rel_str = rel.to_string_lossy().replace('\\', "/");
            if globs.is_match(&rel_str) {
                return true;
            }
        }

        false
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
