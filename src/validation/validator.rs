//! Validation entry point.
//!
//! Delegates to the external compiler when it can be found, otherwise runs
//! the local heuristic checks against the catalog snapshot held by the
//! validator.

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::ComponentCatalog;
use crate::error::{Error, Result};
use crate::external::{ExternalCompiler, ToolVerdict};

use super::diagnostic::{Diagnostic, ErrorKind, ValidationVerdict};
use super::engine::validate_document_with;
use super::stability::StabilityLevel;

/// Validates and formats configuration text
#[derive(Debug, Clone)]
pub struct Validator {
    catalog: Arc<ComponentCatalog>,
    external: Option<ExternalCompiler>,
}

impl Validator {
    /// A validator that only ever runs the local checks.
    pub fn new(catalog: Arc<ComponentCatalog>) -> Self {
        Self {
            catalog,
            external: None,
        }
    }

    pub fn with_external(mut self, compiler: ExternalCompiler) -> Self {
        self.external = Some(compiler);
        self
    }

    /// Same settings over a different catalog snapshot.
    pub fn with_catalog(&self, catalog: Arc<ComponentCatalog>) -> Self {
        Self {
            catalog,
            external: self.external.clone(),
        }
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    /// Path of the external compiler, if configured and present right now.
    pub fn external_executable(&self) -> Option<PathBuf> {
        self.external.as_ref()?.locate()
    }

    /// Validate `config`.
    ///
    /// With `prefer_external` set and the compiler available, its verdict is
    /// final and the local checks do not run. Failing to stage the temporary
    /// file is an error; every other external failure becomes an invalid
    /// verdict carrying one diagnostic.
    pub async fn validate(
        &self,
        config: &str,
        stability_level: Option<&str>,
        prefer_external: bool,
    ) -> Result<ValidationVerdict> {
        if prefer_external {
            if let Some((compiler, executable)) = self.resolve_external() {
                log::debug!("Validating with {}", executable.display());
                let outcome = compiler
                    .validate(&executable, config, stability_level)
                    .await;
                return external_verdict(outcome);
            }
            log::debug!("External compiler unavailable, using built-in checks");
        }

        Ok(self.validate_fallback(config, stability_level))
    }

    /// Run only the local heuristic checks.
    pub fn validate_fallback(
        &self,
        config: &str,
        stability_level: Option<&str>,
    ) -> ValidationVerdict {
        let stability = stability_level.and_then(|level| match level.parse::<StabilityLevel>() {
            Ok(level) => Some(level),
            Err(e) => {
                log::debug!("{}; skipping stability hints", e);
                None
            }
        });

        validate_document_with(config, &self.catalog, stability).into()
    }

    /// Format `config` with the external compiler, or return it unchanged
    /// when the compiler is unavailable.
    pub async fn format(&self, config: &str) -> Result<String> {
        match self.resolve_external() {
            Some((compiler, executable)) => compiler.format(&executable, config).await,
            None => Ok(config.to_string()),
        }
    }

    fn resolve_external(&self) -> Option<(&ExternalCompiler, PathBuf)> {
        let compiler = self.external.as_ref()?;
        let executable = compiler.locate()?;
        Some((compiler, executable))
    }
}

fn external_verdict(outcome: Result<ToolVerdict>) -> Result<ValidationVerdict> {
    let message = match outcome {
        Ok(ToolVerdict::Passed) => return Ok(ValidationVerdict::valid()),
        Ok(ToolVerdict::Failed { status, stderr }) => {
            if stderr.trim().is_empty() {
                format!("alloy validate exited with {}", status)
            } else {
                stderr
            }
        }
        Err(e @ Error::Resource { .. }) => return Err(e),
        Err(e) => e.to_string(),
    };

    Ok(ValidationVerdict::from_diagnostics(vec![Diagnostic::error(
        0,
        0,
        ErrorKind::ExternalTool,
        message,
    )]))
}
