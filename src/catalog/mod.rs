//! Component catalog
//!
//! The set of known `category.name` component identifiers, with the metadata
//! and recipes shipped alongside them.

pub mod manager;
pub mod registry;
pub mod schema;

pub use manager::{load_catalog, CatalogManager, SharedCatalog};
pub use registry::{CatalogBuilder, ComponentCatalog};
pub use schema::{Component, ComponentFilter, Recipe, RecipeFilter};
