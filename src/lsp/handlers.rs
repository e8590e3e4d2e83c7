use std::sync::LazyLock;

use regex::Regex;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;

use crate::catalog::{Component, ComponentCatalog};
use crate::lsp::backend::Backend;
use crate::lsp::document::{utf16_len, utf16_offset, word_at, DocumentState};
use crate::validation::{self, ErrorKind, Severity};

/// `<identifier> "<label>" {` or `<identifier> {` at the start of a line.
static DECLARATION_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"^\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)+)\s*(?:"([^"]*)"\s*)?\{"#).ok()
});

/// Trait for handling hover requests
#[tower_lsp::async_trait]
pub trait HandleHover {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>>;
}

/// Trait for handling completion requests
#[tower_lsp::async_trait]
pub trait HandleCompletion {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>>;
}

/// Trait for handling document symbols
#[tower_lsp::async_trait]
pub trait HandleDocumentSymbol {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>>;
}

/// Trait for handling diagnostics
#[tower_lsp::async_trait]
pub trait HandleDiagnostics {
    async fn publish_diagnostics(&self, uri: Url);
}

/// Trait for handling whole-document formatting
#[tower_lsp::async_trait]
pub trait HandleFormatting {
    async fn handle_formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> LspResult<Option<Vec<TextEdit>>>;
}

#[tower_lsp::async_trait]
impl HandleHover for Backend {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let tdpp = params.text_document_position_params;
        let uri = tdpp.text_document.uri;
        let pos = tdpp.position;

        let line = {
            let docs = self.documents.lock().await;
            match docs.get(&uri).and_then(|doc| doc.line(pos.line as usize)) {
                Some(line) => line.to_string(),
                None => return Ok(None),
            }
        };

        let catalog = self.catalog_snapshot().await;
        let Some((component, (start, end))) =
            component_at(&line, pos.character as usize, &catalog)
        else {
            return Ok(None);
        };

        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: hover_markdown(component),
            }),
            range: Some(Range::new(
                Position::new(pos.line, utf16_offset(&line, start)),
                Position::new(pos.line, utf16_offset(&line, end)),
            )),
        }))
    }
}

#[tower_lsp::async_trait]
impl HandleCompletion for Backend {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let pos = params.text_document_position.position;

        let line = {
            let docs = self.documents.lock().await;
            match docs.get(&uri).and_then(|doc| doc.line(pos.line as usize)) {
                Some(line) => line.to_string(),
                None => return Ok(None),
            }
        };

        let catalog = self.catalog_snapshot().await;
        let completions = completion_items(&line, pos, &catalog);

        if completions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(completions)))
        }
    }
}

#[tower_lsp::async_trait]
impl HandleDiagnostics for Backend {
    /// Validate the stored text of `uri` and publish the result
    async fn publish_diagnostics(&self, uri: Url) {
        let (content, version) = {
            let docs = self.documents.lock().await;
            match docs.get(&uri) {
                Some(state) => (state.content.clone(), state.version),
                None => return,
            }
        };

        let validator = self.validator().await;
        let verdict = match validator
            .validate(
                &content,
                self.config.stability_level.as_deref(),
                self.config.prefer_external,
            )
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => {
                log::error!("Validation of {} failed: {}", uri, e);
                self.client
                    .log_message(MessageType::ERROR, format!("Validation failed: {}", e))
                    .await;
                return;
            }
        };

        // A newer edit will publish its own result.
        let current = self.documents.lock().await.get(&uri).map(|doc| doc.version);
        if current != Some(version) {
            log::debug!("Dropping stale diagnostics for {}", uri);
            return;
        }

        let diagnostics = verdict
            .diagnostics()
            .iter()
            .map(|d| to_lsp_diagnostic(d, &content))
            .collect();

        self.client
            .publish_diagnostics(uri, diagnostics, version)
            .await;
    }
}

#[tower_lsp::async_trait]
impl HandleDocumentSymbol for Backend {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;

        let content = {
            let docs = self.documents.lock().await;
            match docs.get(&uri) {
                Some(state) => state.content.clone(),
                None => return Ok(None),
            }
        };

        let catalog = self.catalog_snapshot().await;
        Ok(Some(DocumentSymbolResponse::Nested(document_symbols(
            &content, &catalog,
        ))))
    }
}

#[tower_lsp::async_trait]
impl HandleFormatting for Backend {
    async fn handle_formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> LspResult<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;

        let doc = {
            let docs = self.documents.lock().await;
            match docs.get(&uri) {
                Some(state) => state.clone(),
                None => return Ok(None),
            }
        };

        let validator = self.validator().await;
        match validator.format(&doc.content).await {
            Ok(formatted) => Ok(formatting_edits(&doc, &formatted)),
            Err(e) => {
                log::warn!("Formatting {} failed: {}", uri, e);
                self.client
                    .show_message(MessageType::WARNING, format!("alloy fmt failed: {}", e))
                    .await;
                Ok(None)
            }
        }
    }
}

/// Convert a validation diagnostic to its LSP form.
///
/// Column 0 covers the whole line; otherwise the range starts at the column
/// and runs to the end of the token found there.
pub fn to_lsp_diagnostic(diagnostic: &validation::Diagnostic, content: &str) -> Diagnostic {
    let severity = match diagnostic.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    };

    let line_idx = diagnostic.line.saturating_sub(1);
    let line = content.split('\n').nth(line_idx).unwrap_or("");
    let line_no = line_idx as u32;

    let range = if diagnostic.column == 0 {
        Range::new(Position::new(line_no, 0), Position::new(line_no, utf16_len(line)))
    } else {
        let start = (diagnostic.column - 1).min(line.len());
        let end = line[start..]
            .find(char::is_whitespace)
            .map_or(line.len(), |len| start + len);
        Range::new(
            Position::new(line_no, utf16_offset(line, start)),
            Position::new(line_no, utf16_offset(line, end.max(start + 1))),
        )
    };

    let code = match diagnostic.kind {
        ErrorKind::Structural => "structural",
        ErrorKind::Reference => "reference",
        ErrorKind::Syntax => "syntax",
        ErrorKind::Stability => "stability",
        ErrorKind::ExternalTool => "alloy-validate",
    };

    Diagnostic::new(
        range,
        Some(severity),
        Some(NumberOrString::String(code.to_string())),
        Some("alloy-ls".to_string()),
        diagnostic.message.clone(),
        None,
        None,
    )
}

/// The catalog component named by the longest dotted prefix of the word
/// under `char_idx`, with the byte span of that prefix.
pub fn component_at<'a>(
    line: &str,
    char_idx: usize,
    catalog: &'a ComponentCatalog,
) -> Option<(&'a Component, (usize, usize))> {
    let (start, end) = word_at(line, char_idx)?;
    let word = &line[start..end];

    let mut candidate = word;
    loop {
        if let Some(component) = catalog.get(candidate) {
            return Some((component, (start, start + candidate.len())));
        }
        candidate = &candidate[..candidate.rfind('.')?];
    }
}

pub fn hover_markdown(component: &Component) -> String {
    let title = if component.display_name.is_empty() {
        component.identifier()
    } else {
        component.display_name.clone()
    };

    let mut text = format!("**{}** `{}`", title, component.identifier());
    if !component.stability.is_empty() {
        text.push_str(&format!(" _{}_", component.stability));
    }
    if !component.description.is_empty() {
        text.push_str("\n\n");
        text.push_str(&component.description);
    }

    let required: Vec<&str> = component
        .arguments
        .iter()
        .filter(|arg| arg.required)
        .map(|arg| arg.name.as_str())
        .collect();
    if !required.is_empty() {
        text.push_str("\n\n**Required arguments:** ");
        text.push_str(
            &required
                .iter()
                .map(|name| format!("`{}`", name))
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    if !component.documentation_url.is_empty() {
        text.push_str(&format!("\n\n[Documentation]({})", component.documentation_url));
    }
    text
}

/// Catalog identifiers completing the word that ends at `pos`.
///
/// A word containing a `.` restricts candidates to that category.
pub fn completion_items(
    line: &str,
    pos: Position,
    catalog: &ComponentCatalog,
) -> Vec<CompletionItem> {
    let char_idx = pos.character as usize;
    let prefix_chars: Vec<char> = line.chars().take(char_idx).collect();
    let is_word = |c: &char| c.is_alphanumeric() || *c == '_' || *c == '.';
    let typed: String = {
        let start = prefix_chars
            .iter()
            .rposition(|c| !is_word(c))
            .map_or(0, |idx| idx + 1);
        prefix_chars[start..].iter().collect()
    };

    // Only the first token of a line can name a component.
    let before: String = prefix_chars[..prefix_chars.len() - typed.chars().count()]
        .iter()
        .collect();
    if !before.trim().is_empty() {
        return Vec::new();
    }

    let typed_start = pos
        .character
        .saturating_sub(typed.encode_utf16().count() as u32);
    let replace = Range::new(Position::new(pos.line, typed_start), pos);

    let candidates: Vec<&Component> = match typed.split_once('.') {
        Some((category, _)) => catalog
            .identifiers_in_category(category)
            .filter_map(|id| catalog.get(id))
            .collect(),
        None => catalog
            .identifiers()
            .iter()
            .filter_map(|id| catalog.get(id))
            .collect(),
    };

    candidates
        .into_iter()
        .filter(|component| component.identifier().starts_with(typed.as_str()))
        .map(|component| {
            let identifier = component.identifier();
            CompletionItem {
                label: identifier.clone(),
                kind: Some(CompletionItemKind::CLASS),
                detail: Some(if component.stability.is_empty() {
                    component.display_name.clone()
                } else {
                    format!("{} ({})", component.display_name, component.stability)
                }),
                documentation: Some(Documentation::MarkupContent(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: hover_markdown(component),
                })),
                filter_text: Some(identifier.clone()),
                text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(replace, identifier))),
                ..Default::default()
            }
        })
        .collect()
}

/// One symbol per declaration line.
pub fn document_symbols(content: &str, catalog: &ComponentCatalog) -> Vec<DocumentSymbol> {
    let mut symbols = Vec::new();
    let Some(declaration_re) = DECLARATION_RE.as_ref() else {
        return symbols;
    };

    for (line_idx, line) in content.split('\n').enumerate() {
        let Some(captures) = declaration_re.captures(line) else {
            continue;
        };
        let Some(identifier) = captures.get(1) else {
            continue;
        };

        let name = match captures.get(2) {
            Some(label) => format!("{} \"{}\"", identifier.as_str(), label.as_str()),
            None => identifier.as_str().to_string(),
        };

        let line_no = line_idx as u32;
        let range = Range::new(Position::new(line_no, 0), Position::new(line_no, utf16_len(line)));
        let selection_range = Range::new(
            Position::new(line_no, utf16_offset(line, identifier.start())),
            Position::new(line_no, utf16_offset(line, identifier.end())),
        );

        symbols.push(DocumentSymbol {
            name,
            detail: catalog
                .get(identifier.as_str())
                .map(|component| component.display_name.clone())
                .filter(|detail| !detail.is_empty()),
            kind: if captures.get(2).is_some() {
                SymbolKind::OBJECT
            } else {
                SymbolKind::NAMESPACE
            },
            tags: None,
            #[allow(deprecated)]
            deprecated: Some(false), // Required by tower-lsp 0.20
            range,
            selection_range,
            children: None,
        });
    }

    symbols
}

/// A single whole-document edit, or `None` when nothing changed.
///
/// The formatter trims its output; a trailing newline in the document is
/// kept.
pub fn formatting_edits(doc: &DocumentState, formatted: &str) -> Option<Vec<TextEdit>> {
    let mut new_text = formatted.to_string();
    if doc.content.ends_with('\n') && !new_text.ends_with('\n') {
        new_text.push('\n');
    }
    if new_text == doc.content {
        return None;
    }
    Some(vec![TextEdit::new(doc.full_range(), new_text)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(identifier: &str, stability: &str) -> Component {
        let (category, name) = identifier.rsplit_once('.').unwrap();
        Component {
            id: identifier.replace('.', "-"),
            category: category.to_string(),
            name: name.to_string(),
            display_name: format!("Display {}", name),
            description: format!("Describes {}", identifier),
            stability: stability.to_string(),
            signals: vec![],
            component_type: String::new(),
            arguments: vec![],
            blocks: vec![],
            exports: vec![],
            examples: vec![],
            documentation_url: format!("https://example.test/{}", identifier),
        }
    }

    fn catalog() -> ComponentCatalog {
        ComponentCatalog::from_components([
            component("discovery.kubernetes", "stable"),
            component("discovery.relabel", "stable"),
            component("prometheus.scrape", "stable"),
            component("prometheus.exporter.unix", "stable"),
            component("pyroscope.scrape", "beta"),
        ])
    }

    #[test]
    fn test_diagnostic_ranges() {
        let content = "logging {\n  x == 5\n}";
        let d = validation::Diagnostic::error(2, 5, ErrorKind::Syntax, "==");
        let lsp = to_lsp_diagnostic(&d, content);
        assert_eq!(lsp.range, Range::new(Position::new(1, 4), Position::new(1, 6)));
        assert_eq!(lsp.severity, Some(DiagnosticSeverity::ERROR));

        let whole = validation::Diagnostic::error(3, 0, ErrorKind::Structural, "Unclosed");
        let lsp = to_lsp_diagnostic(&whole, content);
        assert_eq!(lsp.range, Range::new(Position::new(2, 0), Position::new(2, 1)));

        let external = validation::Diagnostic::error(0, 0, ErrorKind::ExternalTool, "boom");
        let lsp = to_lsp_diagnostic(&external, content);
        assert_eq!(lsp.range.start, Position::new(0, 0));
        assert_eq!(lsp.code, Some(NumberOrString::String("alloy-validate".to_string())));
    }

    #[test]
    fn test_warning_maps_to_lsp_warning() {
        let d = validation::Diagnostic::warning(1, 1, ErrorKind::Stability, "beta");
        let lsp = to_lsp_diagnostic(&d, "pyroscope.scrape \"p\" {");
        assert_eq!(lsp.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(lsp.range.end, Position::new(0, 16));
    }

    #[test]
    fn test_component_at_longest_prefix() {
        let catalog = catalog();
        let line = "  prometheus.exporter.unix.targets";
        let (component, (start, end)) = component_at(line, 10, &catalog).unwrap();
        assert_eq!(component.identifier(), "prometheus.exporter.unix");
        assert_eq!(&line[start..end], "prometheus.exporter.unix");

        let line = "targets = discovery.kubernetes.pods.targets";
        let (component, _) = component_at(line, 15, &catalog).unwrap();
        assert_eq!(component.identifier(), "discovery.kubernetes");

        assert!(component_at("loki.write \"x\" {", 2, &catalog).is_none());
    }

    #[test]
    fn test_hover_markdown_contents() {
        let text = hover_markdown(&component("pyroscope.scrape", "beta"));
        assert!(text.starts_with("**Display scrape** `pyroscope.scrape` _beta_"));
        assert!(text.contains("Describes pyroscope.scrape"));
        assert!(text.contains("[Documentation](https://example.test/pyroscope.scrape)"));
    }

    #[test]
    fn test_completion_filters_by_category() {
        let catalog = catalog();
        let items = completion_items("discovery.", Position::new(0, 10), &catalog);
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["discovery.kubernetes", "discovery.relabel"]);

        match &items[0].text_edit {
            Some(CompletionTextEdit::Edit(edit)) => {
                assert_eq!(edit.range, Range::new(Position::new(0, 0), Position::new(0, 10)));
            }
            other => panic!("unexpected edit: {:?}", other),
        }
    }

    #[test]
    fn test_completion_contexts() {
        let catalog = catalog();
        assert_eq!(completion_items("", Position::new(0, 0), &catalog).len(), 5);
        let items = completion_items("  pro", Position::new(3, 5), &catalog);
        assert_eq!(items.len(), 2);
        // Not at the start of a line.
        assert!(completion_items("  targets = disc", Position::new(0, 16), &catalog).is_empty());
    }

    #[test]
    fn test_document_symbols() {
        let catalog = catalog();
        let content = "// comment\ndiscovery.kubernetes \"pods\" {\n  role = \"pod\"\n}\n\nlogging {\n}\n";
        let symbols = document_symbols(content, &catalog);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "discovery.kubernetes \"pods\"");
        assert_eq!(symbols[0].detail.as_deref(), Some("Display kubernetes"));
        assert_eq!(symbols[0].selection_range.start, Position::new(1, 0));
        assert_eq!(symbols[0].selection_range.end, Position::new(1, 20));

        let content = "prometheus.exporter.unix \"host\" {\n}\nloki.write {\n}";
        let symbols = document_symbols(content, &catalog);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[1].name, "loki.write");
        assert_eq!(symbols[1].kind, SymbolKind::NAMESPACE);
        assert_eq!(symbols[1].detail, None);
    }

    #[test]
    fn test_formatting_edits() {
        let doc = DocumentState::new("logging   {\n}\n".to_string(), Some(1));
        let edits = formatting_edits(&doc, "logging {\n}").unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "logging {\n}\n");
        assert_eq!(edits[0].range.end, Position::new(2, 0));

        assert!(formatting_edits(&doc, "logging   {\n}").is_none());
    }
}
