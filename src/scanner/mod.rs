//! Single-pass scanner over Alloy configuration text.
//!
//! Walks every non-exempt line character by character, feeding the brace and
//! quote state machine, and reports structural diagnostics. The per-line
//! callback lets the diagnostics engine run its line checks in the same
//! pass, after the line's characters have been scanned.

pub mod line;
pub mod state;

pub use line::{classify, lines, Line, LineKind};
pub use state::{ScanEvent, ScanState, Unclosed};

use crate::validation::{ErrorKind, ValidationResult};

/// Scan `content`, calling `on_line` for every non-exempt line once its
/// characters have been processed.
pub fn scan_with<F>(content: &str, result: &mut ValidationResult, mut on_line: F)
where
    F: FnMut(&Line<'_>, &mut ValidationResult),
{
    let mut state = ScanState::new();
    let mut last_line = 0;

    for line in lines(content) {
        last_line = line.number;
        if line.kind.is_exempt() {
            continue;
        }

        let mut prev = None;
        for (idx, ch) in line.raw.char_indices() {
            if let Some(ScanEvent::UnexpectedClose) = state.step(line.number, ch, prev) {
                result.add_error(
                    line.number,
                    idx + 1,
                    ErrorKind::Structural,
                    "Unexpected closing brace '}'".to_string(),
                );
            }
            prev = Some(ch);
        }

        on_line(&line, result);
    }

    let unclosed = state.finish();
    if let Some((line, count)) = unclosed.braces {
        result.add_error(
            line,
            0,
            ErrorKind::Structural,
            format!("Unclosed brace — missing {} closing brace(s)", count),
        );
    }
    if unclosed.quote {
        result.add_error(
            last_line,
            0,
            ErrorKind::Structural,
            "Unclosed string quote".to_string(),
        );
    }
}

/// Scan `content` for structural problems only.
pub fn scan(content: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    scan_with(content, &mut result, |_, _| {});
    result
}
