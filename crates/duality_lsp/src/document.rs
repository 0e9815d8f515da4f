use tower_lsp::lsp_types::Diagnostic;

/// Per-document state: source text and version, and the (currently always
/// empty) diagnostics derived from it.
///
/// There is no elaboration pipeline behind this server — §6 specifies
/// "diagnostics publication is wired but empty" for exactly this reason —
/// so `diagnostics` has nowhere to come from yet. It is still a real field
/// rather than computed ad hoc at publish time, so that the moment a
/// translator is plugged in here, `did_open`/`did_change` don't need to
/// change shape, only `DocumentState::with_source`'s body.
pub struct DocumentState {
    pub source: String,
    pub version: i32,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentState {
    pub fn new(source: String, version: i32) -> Self {
        DocumentState { source, version, diagnostics: Vec::new() }
    }

    pub fn update(&mut self, source: String, version: i32) {
        self.source = source;
        self.version = version;
        self.diagnostics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_no_diagnostics() {
        let doc = DocumentState::new("do { Void }".to_string(), 1);
        assert_eq!(doc.version, 1);
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn update_replaces_source_and_version() {
        let mut doc = DocumentState::new("do { Void }".to_string(), 1);
        doc.update("do { let x = 'hi'; x }".to_string(), 2);
        assert_eq!(doc.version, 2);
        assert_eq!(doc.source, "do { let x = 'hi'; x }");
    }
}
