use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{
    HandleCompletion, HandleDefinition, HandleDiagnostics, HandleDocumentSymbol, HandleHover,
};
use crate::lsp::workspace::WorkspaceDocuments;
use crate::properties::PropertyRegistry;
use crate::Config;

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub properties: Arc<RwLock<PropertyRegistry>>,
    pub documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    pub workspace: Arc<WorkspaceDocuments>,
    pub config: Arc<RwLock<Config>>,
}

impl Backend {
    pub fn new(client: Client, config: Config, properties: PropertyRegistry) -> Self {
        let documents = Arc::new(Mutex::new(HashMap::new()));
        let workspace = Arc::new(WorkspaceDocuments::new(documents.clone()));

        Self {
            client,
            properties: Arc::new(RwLock::new(properties)),
            documents,
            workspace,
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Store a new snapshot of a document and republish its diagnostics
    async fn update_document(&self, uri: Url, content: String, version: Option<i32>) {
        let state = DocumentState::for_uri(&uri, content, version);

        let mut docs = self.documents.lock().await;
        docs.insert(uri.clone(), state);
        drop(docs); // Release the lock before calling publish_diagnostics

        self.publish_diagnostics(uri).await;
    }

    /// Pick up `.uss-ls.toml` and start watching the workspace
    async fn configure_workspace(&self, root: Option<PathBuf>) {
        self.workspace.set_root(root.clone()).await;

        let Some(root) = root else {
            return;
        };

        let mut config = self.config.write().await;
        match config.load_project_config(&root) {
            Ok(true) => log::info!("Loaded project configuration from {}", root.display()),
            Ok(false) => {}
            Err(e) => {
                self.client
                    .log_message(MessageType::ERROR, format!("{:#}", e))
                    .await;
            }
        }
        self.workspace
            .set_settings(config.project.workspace.clone())
            .await;
        drop(config);

        if let Err(e) = self.workspace.start_watching().await {
            log::warn!("Workspace watching disabled: {:#}", e);
        }
    }
}

/// Workspace root from the initialize request
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    #[allow(deprecated)]
    let root_uri = params.root_uri.clone().or_else(|| {
        params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
    });

    root_uri.and_then(|uri| uri.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        self.configure_workspace(workspace_root(&params)).await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![
                        ":".to_string(),
                        " ".to_string(),
                        "-".to_string(),
                        "<".to_string(),
                        "\"".to_string(),
                    ]),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "uss-language-server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let count = self.properties.read().await.len();
        self.client
            .log_message(
                MessageType::INFO,
                format!("uss-language-server initialized ({} properties)", count),
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

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> tower_lsp::jsonrpc::Result<Option<GotoDefinitionResponse>> {
        self.handle_definition(params).await
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> tower_lsp::jsonrpc::Result<Option<DocumentSymbolResponse>> {
        self.handle_document_symbol(params).await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.update_document(doc.uri, doc.text, Some(doc.version))
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        // Full sync: the last change holds the whole text
        if let Some(change) = params.content_changes.into_iter().last() {
            self.update_document(uri, change.text, Some(version)).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.lock().await.remove(&uri);
        // The file on disk may differ from the buffer that was open
        self.workspace.invalidate(&uri).await;
        self.clear_diagnostics(uri).await;
    }
}
