//! Tests for project configuration driving validation
use std::path::PathBuf;
use std::sync::Arc;

use alloy_language_server::config::{Config, SharedArgs, PROJECT_CONFIG_FILE};
use alloy_language_server::ComponentCatalog;

fn args() -> SharedArgs {
    SharedArgs {
        log_level: "info".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_project_config_drives_validator() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join(PROJECT_CONFIG_FILE),
        "stability_level = \"generally-available\"\nalloy_path = \"/nonexistent/alloy\"\n",
    )
    .expect("write config");

    let config = Config::resolve(args(), dir.path()).expect("resolve");
    assert!(config.prefer_external);
    assert_eq!(config.alloy_path, PathBuf::from("/nonexistent/alloy"));

    // The configured compiler is missing, so the built-in checks run.
    let validator = config.validator(Arc::new(ComponentCatalog::embedded()));
    assert!(validator.external_executable().is_none());

    let verdict = validator
        .validate(
            "pyroscope.ebpf \"profiles\" {\n}",
            config.stability_level.as_deref(),
            config.prefer_external,
        )
        .await
        .expect("validate");
    assert!(verdict.valid);
    assert_eq!(verdict.warnings().len(), 1);
    assert!(verdict.warnings()[0].message.contains("public-preview"));
}

#[test]
fn test_workspace_catalog_dir_is_searched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::resolve(args(), dir.path()).expect("resolve");
    assert!(config
        .catalog_dirs
        .contains(&dir.path().join(".alloy-ls").join("catalog")));
}

#[test]
fn test_invalid_toml_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "stability_level = [").expect("write");
    let err = Config::resolve(args(), dir.path()).expect_err("parse error");
    assert!(format!("{:#}", err).contains("Failed to parse"));
}
