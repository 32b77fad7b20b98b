//! Import Path Resolver
//!
//! Turns the path literal of an `@import` into a document URI. Pure URL
//! composition; nothing is read or checked for existence.

use url::Url;

use crate::core::STYLESHEET_EXTENSION;

/// Resolve an import path against the importing document
///
/// - `./` and `../` paths are relative to the importing document's directory
/// - `/` paths are relative to the workspace root, `None` without one
/// - a path whose file name has no extension gets `.uss` appended
/// - anything else is relative to the importing document's directory
pub fn resolve_import_path(origin: &Url, workspace_root: Option<&Url>, raw: &str) -> Option<Url> {
    compose(origin, workspace_root, raw.trim(), true)
}

fn compose(origin: &Url, workspace_root: Option<&Url>, raw: &str, may_retry: bool) -> Option<Url> {
    if raw.is_empty() {
        return None;
    }

    if may_retry && !has_extension(raw) {
        let amended = format!("{}.{}", raw, STYLESHEET_EXTENSION);
        return compose(origin, workspace_root, &amended, false);
    }

    if raw.starts_with("./") || raw.starts_with("../") {
        return join_relative(origin, raw);
    }

    if let Some(rooted) = raw.strip_prefix('/') {
        let root = as_directory(workspace_root?);
        return root.join(rooted).ok();
    }

    join_relative(origin, raw)
}

/// True when the final path segment carries a `.` other than `.`/`..`
fn has_extension(raw: &str) -> bool {
    let file_name = raw.rsplit('/').next().unwrap_or(raw);
    file_name != "." && file_name != ".." && file_name.contains('.')
}

fn join_relative(origin: &Url, raw: &str) -> Option<Url> {
    if origin.cannot_be_a_base() {
        return None;
    }
    origin.join(raw).ok()
}

/// Make sure joins land inside the root rather than next to it
fn as_directory(root: &Url) -> Url {
    let mut root = root.clone();
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    root
}
