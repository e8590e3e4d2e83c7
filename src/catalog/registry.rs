//! Component Catalog
//!
//! Immutable, in-memory snapshot of known components and recipes. Built once
//! and shared behind an `Arc`; a reload builds a new snapshot instead of
//! mutating this one.

use std::collections::{BTreeMap, BTreeSet};

use super::schema::{Component, ComponentFile, ComponentFilter, Recipe, RecipeFile, RecipeFilter};
use crate::error::{Error, Result};

const EMBEDDED_COMPONENTS: &str = include_str!("../../resources/catalog/components.json");
const EMBEDDED_RECIPES: &str = include_str!("../../resources/catalog/recipes.json");

/// Read-only catalog of component identifiers and metadata
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    components: BTreeMap<String, Component>,
    identifiers: BTreeSet<String>,
    recipes: Vec<Recipe>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog compiled into the binary.
    ///
    /// Embedded data that fails to parse yields an empty section rather than
    /// an error.
    pub fn embedded() -> Self {
        let mut builder = CatalogBuilder::new();
        if let Err(e) = builder.add_components_json(EMBEDDED_COMPONENTS, "embedded components") {
            log::warn!("{}. Continuing without built-in components.", e);
        }
        if let Err(e) = builder.add_recipes_json(EMBEDDED_RECIPES, "embedded recipes") {
            log::warn!("{}. Continuing without built-in recipes.", e);
        }
        builder.build()
    }

    /// Catalog holding exactly the given components.
    pub fn from_components(components: impl IntoIterator<Item = Component>) -> Self {
        let mut builder = CatalogBuilder::new();
        builder.extend(components);
        builder.build()
    }

    /// Every known `category.name` identifier.
    pub fn identifiers(&self) -> &BTreeSet<String> {
        &self.identifiers
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&Component> {
        self.components.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components matching `filter`, ordered by identifier.
    pub fn components(&self, filter: &ComponentFilter) -> Vec<&Component> {
        self.components
            .values()
            .filter(|c| filter.matches(c))
            .collect()
    }

    /// Recipes matching `filter`, in load order.
    pub fn recipes(&self, filter: &RecipeFilter) -> Vec<&Recipe> {
        self.recipes.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Known identifiers under `category.`, sorted.
    pub fn identifiers_in_category<'a>(
        &'a self,
        category: &str,
    ) -> impl Iterator<Item = &'a str> + use<'a> {
        let prefix = format!("{}.", category);
        self.identifiers
            .range(prefix.clone()..)
            .take_while(move |id| id.starts_with(&prefix))
            .map(String::as_str)
    }
}

/// Accumulates catalog sources; later entries override earlier ones with
/// the same identifier.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    components: BTreeMap<String, Component>,
    recipes: Vec<Recipe>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the embedded catalog.
    pub fn from_embedded() -> Self {
        let embedded = ComponentCatalog::embedded();
        Self {
            components: embedded.components,
            recipes: embedded.recipes,
        }
    }

    pub fn extend(&mut self, components: impl IntoIterator<Item = Component>) {
        for component in components {
            self.components.insert(component.identifier(), component);
        }
    }

    pub fn add_components_json(&mut self, content: &str, origin: &str) -> Result<usize> {
        let file: ComponentFile = serde_json::from_str(content).map_err(|source| Error::Catalog {
            origin: origin.to_string(),
            source,
        })?;
        let count = file.components.len();
        self.extend(file.components);
        Ok(count)
    }

    pub fn add_recipes_json(&mut self, content: &str, origin: &str) -> Result<usize> {
        let file: RecipeFile = serde_json::from_str(content).map_err(|source| Error::Catalog {
            origin: origin.to_string(),
            source,
        })?;
        let count = file.recipes.len();
        for recipe in file.recipes {
            match self.recipes.iter_mut().find(|r| r.id == recipe.id) {
                Some(existing) => *existing = recipe,
                None => self.recipes.push(recipe),
            }
        }
        Ok(count)
    }

    pub fn build(self) -> ComponentCatalog {
        let identifiers = self.components.keys().cloned().collect();
        ComponentCatalog {
            components: self.components,
            identifiers,
            recipes: self.recipes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = ComponentCatalog::embedded();
        assert!(!catalog.is_empty());
        assert!(catalog.contains("discovery.kubernetes"));
        assert!(catalog.contains("prometheus.scrape"));
        assert!(!catalog.recipes(&RecipeFilter::default()).is_empty());
    }

    #[test]
    fn test_identifiers_are_case_sensitive() {
        let catalog = ComponentCatalog::embedded();
        assert!(catalog.contains("loki.write"));
        assert!(!catalog.contains("Loki.Write"));
    }

    #[test]
    fn test_identifiers_in_category_stops_at_prefix() {
        let catalog = ComponentCatalog::embedded();
        let discovery: Vec<_> = catalog.identifiers_in_category("discovery").collect();
        assert!(!discovery.is_empty());
        assert!(discovery.iter().all(|id| id.starts_with("discovery.")));

        let mut sorted = discovery.clone();
        sorted.sort();
        assert_eq!(discovery, sorted);

        assert_eq!(catalog.identifiers_in_category("nope").count(), 0);
    }

    #[test]
    fn test_later_source_overrides() {
        let mut builder = CatalogBuilder::new();
        builder
            .add_components_json(
                r#"{"components":[{"category":"local","name":"file","description":"first"}]}"#,
                "a",
            )
            .unwrap();
        builder
            .add_components_json(
                r#"{"components":[{"category":"local","name":"file","description":"second"}]}"#,
                "b",
            )
            .unwrap();
        let catalog = builder.build();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("local.file").unwrap().description, "second");
    }

    #[test]
    fn test_invalid_json_names_origin() {
        let mut builder = CatalogBuilder::new();
        let err = builder.add_components_json("{not json", "user.json").unwrap_err();
        assert!(err.to_string().contains("user.json"));
    }
}
