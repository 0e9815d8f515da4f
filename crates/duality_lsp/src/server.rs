use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::state::ServerState;

pub struct DualityServer {
    client: Client,
    state: ServerState,
}

impl DualityServer {
    pub fn new(client: Client) -> Self {
        DualityServer { client, state: ServerState::new() }
    }

    async fn publish_diagnostics(&self, uri: Url) {
        if let Some(doc) = self.state.documents.get(&uri) {
            self.client.publish_diagnostics(uri.clone(), doc.diagnostics.clone(), Some(doc.version)).await;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for DualityServer {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "duality-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("duality-lsp initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        self.state.open_document(params.text_document.uri, params.text_document.text, params.text_document.version);
        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        // Text sync is FULL, so there's exactly one change carrying the whole document.
        if let Some(change) = params.content_changes.into_iter().next() {
            self.state.update_document(&uri, change.text, params.text_document.version);
        }
        self.publish_diagnostics(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state.close_document(&params.text_document.uri);
        self.client.publish_diagnostics(params.text_document.uri, vec![], None).await;
    }

    async fn hover(&self, _: HoverParams) -> Result<Option<Hover>> {
        // No translator sits behind this server yet (see `duality_core::surface`),
        // so there is nothing honest to hover over. A null success, per §6.
        Ok(None)
    }
}
