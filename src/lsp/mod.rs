//! LSP Protocol Implementation
//!
//! LSP backend focused on protocol handling; the stylesheet logic lives in
//! the parser, validation and resolve modules.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod server;
pub mod uxml;
pub mod workspace;

pub use backend::Backend;
pub use document::DocumentState;
pub use workspace::WorkspaceDocuments;
