//! Validation Engine
//!
//! Heuristic checks for Alloy configuration and the entry point that prefers
//! the external compiler when one is installed.

pub mod diagnostic;
pub mod engine;
pub mod stability;
pub mod validator;

pub use diagnostic::{Diagnostic, ErrorKind, Severity, ValidationResult, ValidationVerdict};
pub use engine::{
    declaration, suggest_components, validate_document, validate_line, Declaration, NO_SUGGESTION,
};
pub use stability::StabilityLevel;
pub use validator::Validator;
