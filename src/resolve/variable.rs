//! Variable Resolver
//!
//! Finds where a custom property is declared: in the origin document first,
//! then in the other documents of the workspace.

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::core::{DocumentProvider, Location, STYLESHEET_PATTERN};
use crate::parser::ParseResult;

use super::search::find_in_documents;

/// Resolve `name` (including its `--` prefix) to its declaration
///
/// Other documents are visited in URI order and the first declaration found
/// wins. Listing and read failures are logged and skipped. Returns `None` as
/// soon as `cancel` fires.
pub async fn resolve_variable<P>(
    name: &str,
    origin_uri: &Url,
    origin: &ParseResult,
    provider: &P,
    cancel: &CancellationToken,
) -> Option<Location>
where
    P: DocumentProvider + ?Sized,
{
    if let Some(location) = resolve_local(name, origin_uri, origin) {
        return Some(location);
    }

    resolve_in_workspace(name, origin_uri, STYLESHEET_PATTERN, provider, cancel).await
}

/// First declaration of `name` in the origin document itself
pub fn resolve_local(name: &str, origin_uri: &Url, origin: &ParseResult) -> Option<Location> {
    let declaration = origin.find_custom_property(name)?;
    Some(Location::new(
        origin_uri.clone(),
        origin.range(declaration.name_span),
    ))
}

/// Search every document matching `pattern` except the origin
pub async fn resolve_in_workspace<P>(
    name: &str,
    origin_uri: &Url,
    pattern: &str,
    provider: &P,
    cancel: &CancellationToken,
) -> Option<Location>
where
    P: DocumentProvider + ?Sized,
{
    find_in_documents(provider, pattern, Some(origin_uri), cancel, |uri, parsed| {
        let declaration = parsed.find_custom_property(name)?;
        log::debug!("Resolved {} in {}", name, uri);
        Some(Location::new(uri.clone(), parsed.range(declaration.name_span)))
    })
    .await
}
