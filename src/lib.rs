//! Alloy Language Server
//!
//! Validation and editor support for Grafana Alloy configuration files.
//!
//! This library provides:
//! - Brace and quote scanning with line-accurate diagnostics
//! - Heuristic component checks against a layered component catalog
//! - Delegation to the `alloy` binary for validation and formatting
//! - LSP protocol implementation
//! - Configuration management

pub mod catalog;
pub mod config;
pub mod error;
pub mod external;
pub mod lsp;
pub mod scanner;
pub mod validation;

pub use catalog::{CatalogManager, Component, ComponentCatalog};
pub use config::Config;
pub use error::{Error, Result};
pub use external::ExternalCompiler;
pub use validation::{
    validate_document, Diagnostic, Severity, ValidationResult, ValidationVerdict, Validator,
};
