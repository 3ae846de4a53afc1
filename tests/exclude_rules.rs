use std::error::Error;
use std::path::{Path, PathBuf};

use devloop::watch::PathFilter;

type TestResult = Result<(), Box<dyn Error>>;

fn filter_at(root: &str) -> PathFilter {
    PathFilter::new(PathBuf::from(root), &[], &[]).expect("default filter builds")
}

#[test]
fn denylisted_names_are_excluded_at_any_depth() -> TestResult {
    let filter = filter_at("/project");

    assert!(filter.is_excluded(Path::new("/project/node_modules")));
    assert!(filter.is_excluded(Path::new("/project/node_modules/lib/index.js")));
    assert!(filter.is_excluded(Path::new("/project/src/vendor/.git/HEAD")));
    assert!(filter.is_excluded(Path::new("/project/target/debug/devloop")));

    Ok(())
}

#[test]
fn ordinary_paths_inside_root_are_kept() -> TestResult {
    let filter = filter_at("/project");

    assert!(!filter.is_excluded(Path::new("/project")));
    assert!(!filter.is_excluded(Path::new("/project/src/app.ts")));
    assert!(!filter.is_excluded(Path::new("/project/docs/index.html")));

    Ok(())
}

#[test]
fn paths_outside_the_root_are_excluded() -> TestResult {
    let filter = filter_at("/project");

    assert!(filter.is_excluded(Path::new("/other/place")));
    assert!(filter.is_excluded(Path::new("/project/../escape.txt")));

    Ok(())
}

#[test]
fn extra_names_extend_the_denylist() -> TestResult {
    let filter = PathFilter::new(PathBuf::from("/project"), &["vendor".to_string()], &[])?;

    assert!(filter.is_excluded(Path::new("/project/vendor/lib.js")));
    assert!(!filter.is_excluded(Path::new("/project/src/lib.js")));

    Ok(())
}

#[test]
fn glob_patterns_exclude_matching_paths() -> TestResult {
    let filter = PathFilter::new(
        PathBuf::from("/project"),
        &[],
        &["**/*.swp".to_string(), "dist/**".to_string()],
    )?;

    assert!(filter.is_excluded(Path::new("/project/src/app.ts.swp")));
    assert!(filter.is_excluded(Path::new("/project/dist/bundle.js")));
    assert!(!filter.is_excluded(Path::new("/project/src/app.ts")));

    Ok(())
}
