//! Validation Engine
//!
//! Brace structure and variable usage checks that need no external knowledge,
//! plus document validation against an optional property knowledge base.

pub mod engine;
pub mod syntax;
pub mod variables;

pub use engine::{validate_document, Diagnostic, DiagnosticKind, Severity, ValidationResult};
pub use syntax::validate_syntax;
pub use variables::validate_variable_usage;
