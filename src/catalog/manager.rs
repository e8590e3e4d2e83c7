//! Catalog loading and live reload.
//!
//! Sources are layered: built-in < user-global < workspace < explicit
//! directory. Each directory may hold any number of `*.json` files carrying
//! a `components` array, a `recipes` array, or both. A later source replaces
//! entries with the same identifier.
//!
//! Readers take an `Arc<ComponentCatalog>` snapshot and keep it for as long
//! as they need; a reload swaps in a new snapshot without touching old ones.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, RwLock};
use tower_lsp::lsp_types::MessageType;
use tower_lsp::Client;

use super::registry::{CatalogBuilder, ComponentCatalog};

/// Shared slot holding the current snapshot.
pub type SharedCatalog = Arc<RwLock<Arc<ComponentCatalog>>>;

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    CatalogFileChanged(PathBuf),
    WatcherError(notify::Error),
}

/// Loads the catalog, publishes snapshots and reloads on file changes
pub struct CatalogManager {
    current: SharedCatalog,
    /// Directories in increasing priority
    catalog_dirs: Vec<PathBuf>,
    _watcher: Option<RecommendedWatcher>,
    watcher_rx: Option<mpsc::UnboundedReceiver<WatcherEvent>>,
    client: Option<Client>,
}

impl CatalogManager {
    /// Create a manager over `catalog_dirs` holding only the built-in catalog
    /// until [`initialize`](Self::initialize) runs.
    pub fn new(catalog_dirs: Vec<PathBuf>) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(ComponentCatalog::embedded()))),
            catalog_dirs,
            _watcher: None,
            watcher_rx: None,
            client: None,
        }
    }

    /// Load every source and start watching the catalog directories.
    pub async fn initialize(&mut self, client: Option<Client>) -> Result<()> {
        self.client = client;

        let catalog = load_catalog(&self.catalog_dirs, self.client.as_ref()).await;
        report(
            self.client.as_ref(),
            MessageType::INFO,
            format!("Loaded {} Alloy components", catalog.len()),
        )
        .await;
        *self.current.write().await = Arc::new(catalog);

        self.start_watching()?;
        Ok(())
    }

    /// The current catalog snapshot.
    pub async fn snapshot(&self) -> Arc<ComponentCatalog> {
        self.current.read().await.clone()
    }

    /// Handle to the snapshot slot, for readers that outlive `&self`.
    pub fn shared(&self) -> SharedCatalog {
        self.current.clone()
    }

    pub fn catalog_dirs(&self) -> &[PathBuf] {
        &self.catalog_dirs
    }

    /// Rebuild the snapshot from all sources now.
    pub async fn reload(&self) {
        Self::reload_static(&self.current, &self.catalog_dirs, self.client.as_ref()).await;
    }

    async fn reload_static(
        current: &SharedCatalog,
        catalog_dirs: &[PathBuf],
        client: Option<&Client>,
    ) {
        let catalog = load_catalog(catalog_dirs, client).await;
        let count = catalog.len();
        *current.write().await = Arc::new(catalog);
        report(
            client,
            MessageType::INFO,
            format!("Catalog reloaded ({} components)", count),
        )
        .await;
    }

    fn start_watching(&mut self) -> Result<()> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                        event.kind
                    {
                        for path in event.paths {
                            if is_catalog_file(&path) {
                                let _ = tx.send(WatcherEvent::CatalogFileChanged(path));
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatcherEvent::WatcherError(e));
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )
        .context("Failed to create catalog file watcher")?;

        for dir in &self.catalog_dirs {
            if dir.is_dir() {
                watcher
                    .watch(dir, RecursiveMode::NonRecursive)
                    .with_context(|| format!("Failed to watch {}", dir.display()))?;
            }
        }

        self._watcher = Some(watcher);
        self.watcher_rx = Some(rx);
        self.start_watcher_task();

        Ok(())
    }

    fn start_watcher_task(&mut self) {
        let Some(mut rx) = self.watcher_rx.take() else {
            return;
        };
        let current = self.current.clone();
        let catalog_dirs = self.catalog_dirs.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    WatcherEvent::CatalogFileChanged(path) => {
                        report(
                            client.as_ref(),
                            MessageType::INFO,
                            format!("Catalog file changed: {}", path.display()),
                        )
                        .await;
                        // Any change rebuilds from every source so overrides
                        // stay consistent.
                        Self::reload_static(&current, &catalog_dirs, client.as_ref()).await;
                    }
                    WatcherEvent::WatcherError(e) => {
                        report(
                            client.as_ref(),
                            MessageType::ERROR,
                            format!("Catalog file watcher error: {}", e),
                        )
                        .await;
                    }
                }
            }
        });
    }
}

/// Build a catalog from the embedded data plus every `*.json` file found in
/// `catalog_dirs`, later directories taking precedence.
///
/// Unreadable or malformed files are reported and skipped.
pub async fn load_catalog(
    catalog_dirs: &[PathBuf],
    client: Option<&Client>,
) -> ComponentCatalog {
    let mut builder = CatalogBuilder::from_embedded();

    for dir in catalog_dirs {
        let files = match catalog_files(dir).await {
            Ok(files) => files,
            Err(e) => {
                report(client, MessageType::ERROR, format!("{:#}", e)).await;
                continue;
            }
        };

        for path in files {
            if let Err(e) = load_catalog_file(&path, &mut builder).await {
                report(
                    client,
                    MessageType::ERROR,
                    format!("Failed to load catalog file {}: {:#}", path.display(), e),
                )
                .await;
            }
        }
    }

    builder.build()
}

async fn load_catalog_file(path: &Path, builder: &mut CatalogBuilder) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

    let origin = path.display().to_string();
    let components = builder.add_components_json(&content, &origin)?;
    let recipes = builder.add_recipes_json(&content, &origin)?;
    log::debug!(
        "Loaded {} components and {} recipes from {}",
        components,
        recipes,
        origin
    );
    Ok(())
}

/// Catalog files in `dir`, sorted so load order is stable.
async fn catalog_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read catalog directory: {}", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_catalog_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_catalog_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}

/// Log locally and, when connected, to the editor.
async fn report(client: Option<&Client>, level: MessageType, message: String) {
    if level == MessageType::ERROR {
        log::error!("{}", message);
    } else if level == MessageType::WARNING {
        log::warn!("{}", message);
    } else {
        log::info!("{}", message);
    }
    if let Some(client) = client {
        client.log_message(level, message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_directory_is_ignored() {
        let catalog = load_catalog(&[PathBuf::from("/nonexistent/alloy-ls/catalog")], None).await;
        assert_eq!(catalog.len(), ComponentCatalog::embedded().len());
    }

    #[tokio::test]
    async fn test_directory_overrides_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("custom.json"),
            r#"{"components":[
                {"category":"custom","name":"widget","stability":"experimental"},
                {"category":"loki","name":"write","description":"patched"}
            ]}"#,
        )
        .await
        .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignored").await.unwrap();

        let catalog = load_catalog(&[dir.path().to_path_buf()], None).await;
        assert!(catalog.contains("custom.widget"));
        assert_eq!(catalog.get("loki.write").unwrap().description, "patched");
        assert_eq!(catalog.len(), ComponentCatalog::embedded().len() + 1);
    }

    #[tokio::test]
    async fn test_malformed_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.json"), "{ broken").await.unwrap();
        tokio::fs::write(
            dir.path().join("b.json"),
            r#"{"components":[{"category":"custom","name":"ok"}]}"#,
        )
        .await
        .unwrap();

        let catalog = load_catalog(&[dir.path().to_path_buf()], None).await;
        assert!(catalog.contains("custom.ok"));
    }

    #[tokio::test]
    async fn test_reload_publishes_new_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CatalogManager::new(vec![dir.path().to_path_buf()]);

        let before = manager.snapshot().await;
        assert!(!before.contains("custom.late"));

        tokio::fs::write(
            dir.path().join("late.json"),
            r#"{"components":[{"category":"custom","name":"late"}]}"#,
        )
        .await
        .unwrap();
        manager.reload().await;

        assert!(manager.snapshot().await.contains("custom.late"));
        // Snapshots already handed out never change.
        assert!(!before.contains("custom.late"));
    }
}
