use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use crate::document::DocumentState;

/// Global server state, shared across all requests.
///
/// Uses `DashMap` for concurrent access without external locking, matching
/// the reference LSP crate this one is scaled down from.
pub struct ServerState {
    pub documents: DashMap<Url, DocumentState>,
}

impl ServerState {
    pub fn new() -> Self {
        ServerState { documents: DashMap::new() }
    }

    pub fn open_document(&self, uri: Url, source: String, version: i32) {
        self.documents.insert(uri, DocumentState::new(source, version));
    }

    pub fn update_document(&self, uri: &Url, source: String, version: i32) {
        if let Some(mut doc) = self.documents.get_mut(uri) {
            doc.update(source, version);
        }
    }

    pub fn close_document(&self, uri: &Url) {
        self.documents.remove(uri);
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
