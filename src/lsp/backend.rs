use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::catalog::{CatalogManager, ComponentCatalog, SharedCatalog};
use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{
    HandleCompletion, HandleDiagnostics, HandleDocumentSymbol, HandleFormatting, HandleHover,
};
use crate::validation::Validator;
use crate::Config;

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub catalog_manager: Arc<Mutex<CatalogManager>>,
    pub catalog: SharedCatalog,
    pub documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    pub config: Config,
    validator: Validator,
}

impl Backend {
    pub fn new(client: Client, config: Config, catalog_manager: CatalogManager) -> Self {
        let catalog = catalog_manager.shared();
        let validator = config.validator(Arc::new(ComponentCatalog::new()));

        Self {
            client,
            catalog_manager: Arc::new(Mutex::new(catalog_manager)),
            catalog,
            documents: Arc::new(Mutex::new(HashMap::new())),
            config,
            validator,
        }
    }

    /// The catalog as of now.
    pub async fn catalog_snapshot(&self) -> Arc<ComponentCatalog> {
        self.catalog.read().await.clone()
    }

    /// A validator bound to the current catalog snapshot.
    pub async fn validator(&self) -> Validator {
        self.validator.with_catalog(self.catalog_snapshot().await)
    }

    async fn store_and_publish(&self, uri: Url, content: String, version: Option<i32>) {
        let mut docs = self.documents.lock().await;
        docs.insert(uri.clone(), DocumentState::new(content, version));
        drop(docs); // Release the lock before calling publish_diagnostics

        self.publish_diagnostics(uri).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        _: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string()]),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "alloy-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let mode = match self.validator.external_executable() {
            Some(path) if self.config.prefer_external => {
                format!("validating with {}", path.display())
            }
            _ => "using built-in checks".to_string(),
        };
        self.client
            .log_message(
                MessageType::INFO,
                format!("alloy-language-server initialized, {}", mode),
            )
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        Ok(())
    }

    async fn hover(&self, params: HoverParams) -> tower_lsp::jsonrpc::Result<Option<Hover>> {
        self.handle_hover(params).await
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> tower_lsp::jsonrpc::Result<Option<CompletionResponse>> {
        self.handle_completion(params).await
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> tower_lsp::jsonrpc::Result<Option<DocumentSymbolResponse>> {
        self.handle_document_symbol(params).await
    }

    async fn formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> tower_lsp::jsonrpc::Result<Option<Vec<TextEdit>>> {
        self.handle_formatting(params).await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.store_and_publish(doc.uri, doc.text, Some(doc.version))
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        if let Some(change) = params.content_changes.into_iter().last() {
            self.store_and_publish(uri, change.text, Some(version)).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.lock().await.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }
}
