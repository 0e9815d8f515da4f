//! # duality-lsp
//!
//! Language Server Protocol integration for Duality.
//!
//! This is deliberately the minimal subset §6 of the kernel's specification
//! names: `initialize`, `initialized`, `shutdown`, `exit`, and
//! `textDocument/{didOpen,didChange,didClose,hover}`, with full-document
//! sync (`TextDocumentSyncKind::FULL`). There is no surface parser behind
//! this server (see `duality_core::surface`), so diagnostics publication is
//! wired up but always empty and hover always answers with a null success —
//! exactly what an elaboration-less boundary can honestly report. A real
//! editor integration gains diagnostics and hover content the moment a
//! translator lands upstream and is plugged into [`document::DocumentState`].
//!
//! Modeled on the reference LSP crate in this codebase's lineage: a
//! `DashMap`-backed [`state::ServerState`], a per-document
//! [`document::DocumentState`], and a `tower_lsp::LanguageServer` impl in
//! [`server`] that looks documents up by URI before dispatching.

pub mod document;
pub mod server;
pub mod state;

pub use server::DualityServer;
pub use state::ServerState;
