use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use devloop::watch::{PathFilter, WatchRegistry, WatchSink};

type TestResult = Result<(), Box<dyn Error>>;

/// Records every watch installation instead of talking to notify, so the
/// traversal can be checked without a live notification backend.
#[derive(Default)]
struct RecordingSink {
    watched: Vec<PathBuf>,
    fail_on: Option<PathBuf>,
}

impl WatchSink for RecordingSink {
    fn watch_dir(&mut self, dir: &Path) -> anyhow::Result<()> {
        if self.fail_on.as_deref() == Some(dir) {
            return Err(anyhow!("permission denied"));
        }
        self.watched.push(dir.to_path_buf());
        Ok(())
    }
}

fn build_tree(root: &Path) -> std::io::Result<()> {
    fs::create_dir_all(root.join("src/components"))?;
    fs::create_dir_all(root.join("docs"))?;
    fs::create_dir_all(root.join("node_modules/leftpad"))?;
    fs::write(root.join("src/app.ts"), "export {}")?;
    Ok(())
}

#[test]
fn rescan_registers_all_non_excluded_directories() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path().to_path_buf();
    build_tree(&root)?;

    let filter = PathFilter::new(root.clone(), &[], &[])?;
    let mut registry = WatchRegistry::new(filter);
    let mut sink = RecordingSink::default();

    registry.rescan(&root, &mut sink);

    assert!(registry.is_watched(&root));
    assert!(registry.is_watched(&root.join("src")));
    assert!(registry.is_watched(&root.join("src/components")));
    assert!(registry.is_watched(&root.join("docs")));
    assert!(!registry.is_watched(&root.join("node_modules")));
    assert!(!registry.is_watched(&root.join("node_modules/leftpad")));
    assert_eq!(registry.len(), 4);

    Ok(())
}

#[test]
fn rescan_is_idempotent() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path().to_path_buf();
    build_tree(&root)?;

    let filter = PathFilter::new(root.clone(), &[], &[])?;
    let mut registry = WatchRegistry::new(filter);
    let mut sink = RecordingSink::default();

    registry.rescan(&root, &mut sink);
    let installed = sink.watched.len();

    registry.rescan(&root, &mut sink);
    assert_eq!(sink.watched.len(), installed);

    Ok(())
}

#[test]
fn rescan_picks_up_directories_created_later() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path().to_path_buf();
    build_tree(&root)?;

    let filter = PathFilter::new(root.clone(), &[], &[])?;
    let mut registry = WatchRegistry::new(filter);
    let mut sink = RecordingSink::default();

    registry.rescan(&root, &mut sink);

    // A whole new subtree appears at runtime; rescanning from its top
    // registers every level.
    fs::create_dir_all(root.join("src/pages/admin"))?;
    registry.rescan(&root.join("src/pages"), &mut sink);

    assert!(registry.is_watched(&root.join("src/pages")));
    assert!(registry.is_watched(&root.join("src/pages/admin")));

    Ok(())
}

#[test]
fn watch_setup_failure_skips_only_that_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path().to_path_buf();
    build_tree(&root)?;

    let filter = PathFilter::new(root.clone(), &[], &[])?;
    let mut registry = WatchRegistry::new(filter);
    let mut sink = RecordingSink {
        fail_on: Some(root.join("docs")),
        ..Default::default()
    };

    registry.rescan(&root, &mut sink);

    assert!(!registry.is_watched(&root.join("docs")));
    assert!(registry.is_watched(&root));
    assert!(registry.is_watched(&root.join("src")));

    Ok(())
}

#[test]
fn ensure_watched_is_a_noop_for_excluded_paths() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path().to_path_buf();
    build_tree(&root)?;

    let filter = PathFilter::new(root.clone(), &[], &[])?;
    let mut registry = WatchRegistry::new(filter);
    let mut sink = RecordingSink::default();

    registry.ensure_watched(&root.join("node_modules"), &mut sink);

    assert!(sink.watched.is_empty());
    assert!(registry.is_empty());

    Ok(())
}
