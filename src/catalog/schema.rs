//! Catalog Schema Types
//!
//! Component and recipe metadata as stored in catalog JSON files.

use serde::{Deserialize, Serialize};

/// Root of a component catalog file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentFile {
    #[serde(default)]
    pub components: Vec<Component>,
}

/// Root of a recipe catalog file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFile {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

/// A component type that may be declared in a configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(default)]
    pub id: String,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stability: String,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub exports: Vec<Export>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub documentation_url: String,
}

impl Component {
    /// The `category.name` reference used in configuration text.
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.category, self.name)
    }
}

/// Component argument definition
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// Nested block definition
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Block {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

/// Exported field definition
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Export {
    pub name: String,
    #[serde(rename = "type")]
    pub export_type: String,
    #[serde(default)]
    pub description: String,
}

/// Usage example
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Example {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
}

/// A ready-made configuration snippet
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub signals: Vec<String>,
    pub configuration: String,
}

/// Field filter for components. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentFilter {
    pub category: Option<String>,
    pub signal: Option<String>,
    pub stability: Option<String>,
    /// Case-insensitive substring of the name or description
    pub search: Option<String>,
}

impl ComponentFilter {
    pub fn matches(&self, component: &Component) -> bool {
        if let Some(category) = &self.category {
            if &component.category != category {
                return false;
            }
        }
        if let Some(stability) = &self.stability {
            if &component.stability != stability {
                return false;
            }
        }
        if let Some(signal) = &self.signal {
            if !component.signals.iter().any(|s| s == signal) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !component.name.to_lowercase().contains(&needle)
                && !component.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Field filter for recipes. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub category: Option<String>,
    pub signal: Option<String>,
    pub difficulty: Option<String>,
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.category.as_ref().is_none_or(|c| &recipe.category == c)
            && self.difficulty.as_ref().is_none_or(|d| &recipe.difficulty == d)
            && self
                .signal
                .as_ref()
                .is_none_or(|s| recipe.signals.iter().any(|r| r == s))
    }
}
