use std::error::Error;
use std::fs;

use devloop::config::{load_and_validate, load_optional};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn missing_file_falls_back_to_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = load_optional(dir.path().join("Devloop.toml"))?;

    assert_eq!(cfg.server.command, None);
    assert_eq!(cfg.server.grace_period_ms, 5000);
    assert_eq!(cfg.watch.root, ".");
    assert_eq!(cfg.watch.debounce_ms, 200);
    assert!(cfg.watch.exclude_dirs.is_empty());
    assert!(cfg.watch.exclude.is_empty());

    Ok(())
}

#[test]
fn full_file_parses() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Devloop.toml");
    fs::write(
        &path,
        r#"
[server]
command = "python3 -m http.server 8080"
grace_period_ms = 1000

[watch]
root = "site"
exclude_dirs = ["vendor"]
exclude = ["**/*.swp"]
debounce_ms = 50
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(
        cfg.server.command.as_deref(),
        Some("python3 -m http.server 8080")
    );
    assert_eq!(cfg.server.grace_period_ms, 1000);
    assert_eq!(cfg.watch.root, "site");
    assert_eq!(cfg.watch.exclude_dirs, vec!["vendor".to_string()]);
    assert_eq!(cfg.watch.exclude, vec!["**/*.swp".to_string()]);
    assert_eq!(cfg.watch.debounce_ms, 50);

    Ok(())
}

#[test]
fn partial_file_keeps_defaults_for_missing_sections() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Devloop.toml");
    fs::write(&path, "[server]\ncommand = \"node server.js\"\n")?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.server.command.as_deref(), Some("node server.js"));
    assert_eq!(cfg.server.grace_period_ms, 5000);
    assert_eq!(cfg.watch.debounce_ms, 200);

    Ok(())
}

#[test]
fn zero_debounce_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Devloop.toml");
    fs::write(&path, "[watch]\ndebounce_ms = 0\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(err.to_string().contains("debounce_ms"));

    Ok(())
}

#[test]
fn blank_command_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Devloop.toml");
    fs::write(&path, "[server]\ncommand = \"   \"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(err.to_string().contains("command"));

    Ok(())
}

#[test]
fn invalid_exclude_glob_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Devloop.toml");
    fs::write(&path, "[watch]\nexclude = [\"src/{broken\"]\n")?;

    assert!(load_and_validate(&path).is_err());

    Ok(())
}
