//! Workspace Documents
//!
//! File-system document provider for the language server. Open editor
//! buffers take precedence over the disk; files read from disk are cached
//! until the watcher reports a change.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use glob::{MatchOptions, Pattern};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, Mutex, RwLock};
use url::Url;

use crate::config::WorkspaceSettings;
use crate::core::{uri_matches, DocumentProvider, STYLESHEET_EXTENSION};
use crate::lsp::document::DocumentState;

/// Events forwarded from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    StylesheetChanged(PathBuf),
    WatcherError(notify::Error),
}

pub struct WorkspaceDocuments {
    root: RwLock<Option<PathBuf>>,
    settings: RwLock<WorkspaceSettings>,
    open_documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    cache: Arc<RwLock<HashMap<Url, String>>>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl WorkspaceDocuments {
    /// Provider backed by the given open-document table
    pub fn new(open_documents: Arc<Mutex<HashMap<Url, DocumentState>>>) -> Self {
        Self {
            root: RwLock::new(None),
            settings: RwLock::new(WorkspaceSettings::default()),
            open_documents,
            cache: Arc::new(RwLock::new(HashMap::new())),
            watcher: Mutex::new(None),
        }
    }

    pub async fn set_root(&self, root: Option<PathBuf>) {
        *self.root.write().await = root;
        self.cache.write().await.clear();
    }

    pub async fn root(&self) -> Option<PathBuf> {
        self.root.read().await.clone()
    }

    /// Workspace root as a directory URL
    pub async fn root_uri(&self) -> Option<Url> {
        let root = self.root.read().await.clone()?;
        Url::from_directory_path(root).ok()
    }

    pub async fn set_settings(&self, settings: WorkspaceSettings) {
        *self.settings.write().await = settings;
    }

    pub async fn pattern(&self) -> String {
        self.settings.read().await.pattern.clone()
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Drop a cached read, e.g. after the file changed on disk
    pub async fn invalidate(&self, uri: &Url) {
        self.cache.write().await.remove(uri);
    }

    /// Watch the workspace root and evict cached stylesheets when they change
    pub async fn start_watching(&self) -> Result<()> {
        let Some(root) = self.root().await else {
            return Ok(());
        };

        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                        event.kind
                    {
                        for path in event.paths {
                            if path.extension().and_then(|s| s.to_str())
                                == Some(STYLESHEET_EXTENSION)
                            {
                                let _ = tx.send(WatcherEvent::StylesheetChanged(path));
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatcherEvent::WatcherError(e));
                }
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(1)),
        )
        .context("Failed to create workspace watcher")?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch workspace: {}", root.display()))?;

        *self.watcher.lock().await = Some(watcher);

        let cache = self.cache.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    WatcherEvent::StylesheetChanged(path) => {
                        if let Ok(uri) = Url::from_file_path(&path) {
                            log::debug!("Stylesheet changed on disk: {}", path.display());
                            cache.write().await.remove(&uri);
                        }
                    }
                    WatcherEvent::WatcherError(e) => {
                        log::warn!("Workspace watcher error: {}", e);
                    }
                }
            }
        });

        log::info!("Watching workspace {}", root.display());
        Ok(())
    }
}

#[tower_lsp::async_trait]
impl DocumentProvider for WorkspaceDocuments {
    async fn list_documents(&self, pattern: &str) -> Result<Vec<Url>> {
        let mut uris: BTreeSet<Url> = self
            .open_documents
            .lock()
            .await
            .keys()
            .filter(|uri| uri_matches(uri, pattern))
            .cloned()
            .collect();

        if let Some(root) = self.root().await {
            let exclude = self.settings.read().await.exclude.clone();
            let pattern = pattern.to_string();
            let on_disk = tokio::task::spawn_blocking(move || list_files(&root, &pattern, &exclude))
                .await
                .context("Workspace listing task failed")??;
            uris.extend(on_disk);
        }

        Ok(uris.into_iter().collect())
    }

    async fn read_document(&self, uri: &Url) -> Result<String> {
        if let Some(state) = self.open_documents.lock().await.get(uri) {
            return Ok(state.content.clone());
        }

        if let Some(text) = self.cache.read().await.get(uri) {
            return Ok(text.clone());
        }

        let path = uri
            .to_file_path()
            .map_err(|_| anyhow!("Not a file URI: {}", uri))?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read stylesheet: {}", path.display()))?;

        self.cache.write().await.insert(uri.clone(), text.clone());
        Ok(text)
    }
}

/// Glob `pattern` under `root`, dropping paths matching an exclude pattern
/// (matched relative to the root)
fn list_files(root: &Path, pattern: &str, exclude: &[String]) -> Result<Vec<Url>> {
    let exclude: Vec<Pattern> = exclude
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                log::warn!("Ignoring invalid exclude pattern '{}': {}", p, e);
                None
            }
        })
        .collect();

    let full_pattern = format!(
        "{}/{}",
        Pattern::escape(&root.to_string_lossy()),
        pattern.trim_start_matches('/')
    );
    let paths = glob::glob_with(&full_pattern, MatchOptions::new())
        .with_context(|| format!("Invalid workspace pattern: {}", pattern))?;

    let mut uris = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                log::debug!("Skipping unreadable path: {}", e);
                continue;
            }
        };

        let relative = path.strip_prefix(root).unwrap_or(&path);
        if exclude.iter().any(|p| p.matches_path(relative)) {
            continue;
        }

        if let Ok(uri) = Url::from_file_path(&path) {
            uris.push(uri);
        }
    }

    Ok(uris)
}
