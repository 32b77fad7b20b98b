//! Core Types
//!
//! Text positions and document access shared by the parser, validators and
//! resolvers.

pub mod document;
pub mod text;

pub use document::{
    is_markup, uri_matches, DocumentProvider, Location, MemoryDocuments, MARKUP_EXTENSION,
    STYLESHEET_EXTENSION, STYLESHEET_PATTERN,
};
pub use text::{LineIndex, Position, Range, Span};
