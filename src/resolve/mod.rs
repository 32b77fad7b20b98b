//! Symbol Resolution
//!
//! Point queries used by go-to-definition and completion: variable
//! declarations and class selectors across documents, and import targets.

pub mod class;
pub mod import;
mod search;
pub mod variable;

pub use class::{resolve_class, workspace_class_names};
pub use import::resolve_import_path;
pub use variable::{resolve_in_workspace, resolve_local, resolve_variable};
