//! Cancellable walk over the stylesheets of a workspace

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::core::DocumentProvider;
use crate::parser::{self, ParseResult};

/// Parse documents matching `pattern` in URI order until `visit` returns a
/// value
///
/// `skip` is left out of the walk. Listing and read failures are logged; a
/// document that cannot be read is passed over. Returns `None` as soon as
/// `cancel` fires.
pub(crate) async fn find_in_documents<P, T, F>(
    provider: &P,
    pattern: &str,
    skip: Option<&Url>,
    cancel: &CancellationToken,
    mut visit: F,
) -> Option<T>
where
    P: DocumentProvider + ?Sized,
    F: FnMut(&Url, &ParseResult) -> Option<T> + Send,
    T: Send,
{
    let listed = tokio::select! {
        _ = cancel.cancelled() => return None,
        listed = provider.list_documents(pattern) => listed,
    };

    let mut candidates = match listed {
        Ok(uris) => uris,
        Err(e) => {
            log::warn!("Failed to list documents for '{}': {:#}", pattern, e);
            return None;
        }
    };
    if let Some(skip) = skip {
        candidates.retain(|uri| uri != skip);
    }
    candidates.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    candidates.dedup();

    for uri in candidates {
        if cancel.is_cancelled() {
            return None;
        }

        let read = tokio::select! {
            _ = cancel.cancelled() => return None,
            read = provider.read_document(&uri) => read,
        };

        let text = match read {
            Ok(text) => text,
            Err(e) => {
                log::debug!("Skipping {}: {:#}", uri, e);
                continue;
            }
        };

        let parsed = parser::parse(&text);
        if let Some(found) = visit(&uri, &parsed) {
            return Some(found);
        }
    }

    None
}
