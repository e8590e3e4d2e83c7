//! Integration tests for the component catalog
use std::time::Duration;

use alloy_language_server::catalog::{
    load_catalog, CatalogManager, ComponentCatalog, ComponentFilter, RecipeFilter,
};
use alloy_language_server::validation::validate_document;

#[test]
fn test_embedded_catalog_contents() {
    let catalog = ComponentCatalog::embedded();
    assert!(catalog.contains("discovery.kubernetes"));
    assert!(catalog.contains("prometheus.exporter.unix"));
    assert!(!catalog.contains("Discovery.Kubernetes"));

    let scrape = catalog.get("prometheus.scrape").expect("prometheus.scrape");
    assert_eq!(scrape.stability, "stable");
    assert!(scrape.arguments.iter().any(|a| a.name == "targets" && a.required));
}

#[test]
fn test_component_filters() {
    let catalog = ComponentCatalog::embedded();

    let discovery = catalog.components(&ComponentFilter {
        category: Some("discovery".to_string()),
        ..Default::default()
    });
    assert!(discovery.len() >= 6);
    assert!(discovery.iter().all(|c| c.category == "discovery"));

    let profiles = catalog.components(&ComponentFilter {
        signal: Some("profiles".to_string()),
        ..Default::default()
    });
    assert!(profiles.iter().any(|c| c.identifier() == "pyroscope.write"));
    assert!(profiles.iter().all(|c| c.signals.iter().any(|s| s == "profiles")));

    let found = catalog.components(&ComponentFilter {
        search: Some("KUBERNETES".to_string()),
        stability: Some("stable".to_string()),
        ..Default::default()
    });
    assert!(found.iter().any(|c| c.identifier() == "discovery.kubernetes"));
    assert!(found.iter().all(|c| c.stability == "stable"));
}

#[test]
fn test_recipe_filters() {
    let catalog = ComponentCatalog::embedded();
    assert_eq!(catalog.recipes(&RecipeFilter::default()).len(), 4);

    let beginner = catalog.recipes(&RecipeFilter {
        difficulty: Some("beginner".to_string()),
        ..Default::default()
    });
    assert!(!beginner.is_empty());
    assert!(beginner.iter().all(|r| r.difficulty == "beginner"));
}

#[test]
fn test_recipes_pass_builtin_validation() {
    let catalog = ComponentCatalog::embedded();
    for recipe in catalog.recipes(&RecipeFilter::default()) {
        let result = validate_document(&recipe.configuration, &catalog);
        assert!(
            result.is_valid(),
            "recipe {} has diagnostics: {:?}",
            recipe.id,
            result.diagnostics
        );
    }
}

#[test]
fn test_component_examples_pass_builtin_validation() {
    let catalog = ComponentCatalog::embedded();
    for component in catalog.components(&ComponentFilter::default()) {
        for example in &component.examples {
            let result = validate_document(&example.code, &catalog);
            assert!(
                result.is_valid(),
                "example '{}' of {} has diagnostics: {:?}",
                example.title,
                component.identifier(),
                result.diagnostics
            );
        }
    }
}

#[tokio::test]
async fn test_layered_directories_later_wins() {
    let global = tempfile::tempdir().expect("tempdir");
    let workspace = tempfile::tempdir().expect("tempdir");
    tokio::fs::write(
        global.path().join("site.json"),
        r#"{"components":[{"category":"site","name":"probe","description":"global"}]}"#,
    )
    .await
    .expect("write");
    tokio::fs::write(
        workspace.path().join("site.json"),
        r#"{"components":[{"category":"site","name":"probe","description":"workspace"}],
            "recipes":[{"id":"site-probe","title":"Probe","configuration":"site.probe \"p\" {\n}"}]}"#,
    )
    .await
    .expect("write");

    let catalog = load_catalog(
        &[global.path().to_path_buf(), workspace.path().to_path_buf()],
        None,
    )
    .await;

    assert_eq!(catalog.get("site.probe").expect("site.probe").description, "workspace");
    assert!(catalog
        .recipes(&RecipeFilter::default())
        .iter()
        .any(|r| r.id == "site-probe"));
}

#[tokio::test]
async fn test_watcher_picks_up_new_catalog_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut manager = CatalogManager::new(vec![dir.path().to_path_buf()]);
    manager.initialize(None).await.expect("initialize");
    assert!(!manager.snapshot().await.contains("custom.dynamic"));

    tokio::fs::write(
        dir.path().join("dynamic.json"),
        r#"{"components":[{"category":"custom","name":"dynamic"}]}"#,
    )
    .await
    .expect("write");

    // Wait for the file watcher to detect the change
    let mut loaded = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if manager.snapshot().await.contains("custom.dynamic") {
            loaded = true;
            break;
        }
    }
    assert!(loaded, "catalog should reload after a file is added");
}
