//! Diagnostic and verdict types shared by the fallback validator and the
//! external compiler wrapper.

use serde::Serialize;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What class of mistake a diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Brace or quote imbalance.
    Structural,
    /// Unknown or malformed component identifier.
    Reference,
    /// Operator misuse or an unquoted label.
    Syntax,
    /// Component less stable than the requested stability level.
    Stability,
    /// Output of the external compiler, passed through verbatim.
    ExternalTool,
}

/// A diagnostic message for a validation issue.
///
/// `line` is 1-based; only external compiler output uses line 0. `column` is
/// a 1-based byte offset into the raw line, 0 meaning the whole line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub severity: Severity,
    #[serde(skip)]
    pub kind: ErrorKind,
}

impl Diagnostic {
    pub fn error(line: usize, column: usize, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            severity: Severity::Error,
            kind,
        }
    }

    pub fn warning(line: usize, column: usize, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            severity: Severity::Warning,
            kind,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Accumulates diagnostics in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn add_error(&mut self, line: usize, column: usize, kind: ErrorKind, message: String) {
        self.push(Diagnostic::error(line, column, kind, message));
    }

    pub fn add_warning(&mut self, line: usize, column: usize, kind: ErrorKind, message: String) {
        self.push(Diagnostic::warning(line, column, kind, message));
    }

    pub fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Final answer of a validation call.
///
/// Serializes as `{valid, errors?, warnings?, formatted_config?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    #[serde(skip)]
    diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_config: Option<String>,
}

impl ValidationVerdict {
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            diagnostics.iter().cloned().partition(Diagnostic::is_error);
        Self {
            valid: errors.is_empty(),
            diagnostics,
            errors,
            warnings,
            formatted_config: None,
        }
    }

    pub fn valid() -> Self {
        Self::from_diagnostics(Vec::new())
    }

    /// Every diagnostic in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

impl From<ValidationResult> for ValidationVerdict {
    fn from(result: ValidationResult) -> Self {
        Self::from_diagnostics(result.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_result() {
        let mut result = ValidationResult::new();
        assert!(result.is_valid());

        result.add_warning(1, 0, ErrorKind::Stability, "Test warning".to_string());
        assert!(result.is_valid()); // Warnings don't make it invalid

        result.add_error(2, 3, ErrorKind::Syntax, "Test error".to_string());
        assert!(!result.is_valid());
    }

    #[test]
    fn verdict_splits_by_severity_and_keeps_order() {
        let verdict = ValidationVerdict::from_diagnostics(vec![
            Diagnostic::error(3, 1, ErrorKind::Reference, "first"),
            Diagnostic::warning(1, 1, ErrorKind::Stability, "second"),
            Diagnostic::error(2, 0, ErrorKind::Structural, "third"),
        ]);

        assert!(!verdict.valid);
        assert_eq!(verdict.errors().len(), 2);
        assert_eq!(verdict.warnings().len(), 1);
        let order: Vec<_> = verdict.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn verdict_json_omits_empty_lists() {
        let json = serde_json::to_value(ValidationVerdict::valid()).unwrap();
        assert_eq!(json, serde_json::json!({ "valid": true }));

        let verdict = ValidationVerdict::from_diagnostics(vec![Diagnostic::error(
            4,
            7,
            ErrorKind::Syntax,
            "Use single '=' for assignment, not '=='",
        )]);
        let json = serde_json::to_value(verdict).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["line"], 4);
        assert_eq!(json["errors"][0]["column"], 7);
        assert_eq!(json["errors"][0]["severity"], "error");
        assert!(json.get("warnings").is_none());
    }
}
