//! USS Language Server
//!
//! Language Server Protocol implementation for Unity USS style sheets.
//!
//! This library provides:
//! - USS parsing with exact source spans
//! - Brace structure, variable usage and property validation
//! - Variable, class and import resolution across documents
//! - UXML class references and completions
//! - LSP protocol implementation
//! - Configuration management

pub mod config;
pub mod core;
pub mod lsp;
pub mod parser;
pub mod properties;
pub mod resolve;
pub mod validation;

// Re-exports for the public API
pub use crate::config::Config;
pub use crate::core::{DocumentProvider, Location, MemoryDocuments, Position, Range, Span};
pub use crate::parser::{parse, ParseResult};
pub use crate::properties::{PropertyKnowledge, PropertyRegistry};
pub use crate::resolve::{resolve_class, resolve_import_path, resolve_variable};
pub use crate::validation::{
    validate_document, validate_syntax, validate_variable_usage, Diagnostic, DiagnosticKind,
    Severity,
};
