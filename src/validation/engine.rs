//! Validation Engine
//!
//! Heuristic line checks layered on the scanner: component references,
//! label quoting and `==` misuse.

use crate::catalog::ComponentCatalog;
use crate::scanner::{self, Line};

use super::diagnostic::{ErrorKind, ValidationResult};
use super::stability::StabilityLevel;

/// Returned in place of suggestions when nothing in the catalog shares the
/// candidate's category.
pub const NO_SUGGESTION: &str = "check component reference";

const MAX_SUGGESTIONS: usize = 3;

/// The first two tokens of a line shaped like `<identifier> "<label>" {`
/// or `<identifier> {`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub identifier: &'a str,
    pub label: &'a str,
}

impl Declaration<'_> {
    pub fn is_anonymous(&self) -> bool {
        self.label == "{"
    }
}

/// Recognise a declaration-like line from its trimmed text.
pub fn declaration(trimmed: &str) -> Option<Declaration<'_>> {
    let mut tokens = trimmed.split_whitespace();
    let identifier = tokens.next()?;
    let label = tokens.next()?;

    if label.starts_with('"') || label == "{" {
        Some(Declaration { identifier, label })
    } else {
        None
    }
}

/// Validate an entire document against `catalog`.
pub fn validate_document(content: &str, catalog: &ComponentCatalog) -> ValidationResult {
    validate_document_with(content, catalog, None)
}

/// Validate an entire document, adding stability hints when `stability` is
/// supplied.
pub fn validate_document_with(
    content: &str,
    catalog: &ComponentCatalog,
    stability: Option<StabilityLevel>,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    scanner::scan_with(content, &mut result, |line, result| {
        validate_line(line, catalog, stability, result);
    });
    result
}

/// Run the line-level checks on one non-exempt line.
pub fn validate_line(
    line: &Line<'_>,
    catalog: &ComponentCatalog,
    stability: Option<StabilityLevel>,
    result: &mut ValidationResult,
) {
    if let Some(decl) = declaration(line.trimmed()) {
        validate_declaration(line, &decl, catalog, stability, result);
    }

    if line.raw.contains("==") {
        result.add_error(
            line.number,
            column_of(line.raw, "=="),
            ErrorKind::Syntax,
            "Use single '=' for assignment, not '=='".to_string(),
        );
    }
}

fn validate_declaration(
    line: &Line<'_>,
    decl: &Declaration<'_>,
    catalog: &ComponentCatalog,
    stability: Option<StabilityLevel>,
    result: &mut ValidationResult,
) {
    let column = column_of(line.raw, decl.identifier);

    if !decl.identifier.contains('.') {
        // `logging {`, `rule {`: a plain block, not a component reference.
        if decl.is_anonymous() {
            return;
        }
        result.add_error(
            line.number,
            column,
            ErrorKind::Reference,
            format!(
                "Invalid component '{}'. Components must have format 'category.type' (e.g., discovery.kubernetes)",
                decl.identifier
            ),
        );
    } else if !catalog.contains(decl.identifier) {
        result.add_error(
            line.number,
            column,
            ErrorKind::Reference,
            format!(
                "Unknown component '{}'. Did you mean one of: {}?",
                decl.identifier,
                suggest_components(decl.identifier, catalog)
            ),
        );
    } else if let Some(level) = stability {
        check_stability(line, decl.identifier, column, catalog, level, result);
    }

    if !decl.label.starts_with('"') && !decl.is_anonymous() {
        result.add_error(
            line.number,
            column_of(line.raw, decl.label),
            ErrorKind::Syntax,
            format!("Component label must be quoted: {}", decl.label),
        );
    }
}

fn check_stability(
    line: &Line<'_>,
    identifier: &str,
    column: usize,
    catalog: &ComponentCatalog,
    level: StabilityLevel,
    result: &mut ValidationResult,
) {
    let Some(component) = catalog.get(identifier) else {
        return;
    };
    let Some(required) = StabilityLevel::required_for(&component.stability) else {
        return;
    };

    if !level.permits(required) {
        result.add_warning(
            line.number,
            column,
            ErrorKind::Stability,
            format!(
                "Component '{}' is {} and requires --stability.level={} or lower",
                identifier, component.stability, required
            ),
        );
    }
}

/// Up to three known identifiers sharing the candidate's category, sorted
/// and joined with `", "`.
///
/// The category is the text before the first `.`. This is a prefix filter,
/// not fuzzy matching.
pub fn suggest_components(candidate: &str, catalog: &ComponentCatalog) -> String {
    let mut parts = candidate.split('.');
    let (Some(category), Some(_)) = (parts.next(), parts.next()) else {
        return NO_SUGGESTION.to_string();
    };

    let suggestions: Vec<&str> = catalog
        .identifiers_in_category(category)
        .take(MAX_SUGGESTIONS)
        .collect();

    if suggestions.is_empty() {
        NO_SUGGESTION.to_string()
    } else {
        suggestions.join(", ")
    }
}

/// 1-based byte column of the first occurrence of `needle`, or 0.
fn column_of(raw: &str, needle: &str) -> usize {
    raw.find(needle).map_or(0, |idx| idx + 1)
}
