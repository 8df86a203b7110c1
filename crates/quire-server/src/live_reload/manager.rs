//! Live reload manager.
//!
//! Watches the source directory and broadcasts reloads through the
//! [`ClientRegistry`] once changes settle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::debouncer::ChangeDebouncer;
use super::registry::{BroadcastReport, ClientRegistry};

/// Default debounce duration in milliseconds.
pub(crate) const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Longest sleep between debouncer checks.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Owns the file watcher and the client registry.
pub(crate) struct LiveReloadManager {
    source_dir: PathBuf,
    watch_patterns: Vec<String>,
    registry: Arc<ClientRegistry>,
    watcher: Option<RecommendedWatcher>,
    debounce_ms: u64,
}

impl LiveReloadManager {
    /// Create a new live reload manager.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - Directory to watch for changes
    /// * `watch_patterns` - Glob patterns to match (default `["**/*.md"]`)
    /// * `registry` - Connected clients to notify
    #[must_use]
    pub(crate) fn new(
        source_dir: PathBuf,
        watch_patterns: Option<Vec<String>>,
        registry: Arc<ClientRegistry>,
    ) -> Self {
        Self {
            source_dir,
            watch_patterns: watch_patterns.unwrap_or_else(|| vec!["**/*.md".to_owned()]),
            registry,
            watcher: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }

    /// Set the debounce duration in milliseconds.
    #[must_use]
    pub(crate) fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Connected clients.
    pub(crate) fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Start the file watcher.
    ///
    /// Spawns background tasks that record matching filesystem events and
    /// broadcast a reload per settled path. Must be called inside a tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the file watcher cannot be created.
    pub(crate) fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        // Watcher callbacks report canonical paths on some platforms.
        let source_dir = self
            .source_dir
            .canonicalize()
            .unwrap_or_else(|_| self.source_dir.clone());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // Callback runs on the watcher thread, outside the runtime.
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(err) => tracing::warn!(error = %err, "File watcher error"),
            }
        })?;
        watcher.watch(&source_dir, RecursiveMode::Recursive)?;
        self.watcher = Some(watcher);

        let debouncer = Arc::new(ChangeDebouncer::new(Duration::from_millis(self.debounce_ms)));

        let debouncer_for_record = Arc::clone(&debouncer);
        let watch_patterns = self.watch_patterns.clone();
        let source_dir_for_record = source_dir.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                Self::record_event(
                    &event,
                    &source_dir_for_record,
                    &watch_patterns,
                    &debouncer_for_record,
                );
            }
        });

        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            loop {
                let wait = debouncer.next_deadline().map_or(POLL_INTERVAL, |deadline| {
                    deadline
                        .saturating_duration_since(Instant::now())
                        .min(POLL_INTERVAL)
                });
                tokio::time::sleep(wait).await;
                Self::broadcast_settled(&debouncer, &registry);
            }
        });

        tracing::info!(
            source_dir = %source_dir.display(),
            patterns = ?self.watch_patterns,
            "Watching for changes"
        );

        Ok(())
    }

    /// Send one reload for every path that settled since the last check.
    ///
    /// A reload refreshes the whole page, so a batch of paths costs each
    /// client a single queue slot however many files changed.
    fn broadcast_settled(
        debouncer: &ChangeDebouncer,
        registry: &ClientRegistry,
    ) -> Option<BroadcastReport> {
        let paths = debouncer.drain_ready();
        let first = paths.first()?;

        let report = registry.notify_changed(first);
        tracing::info!(
            path = %first.display(),
            changed = paths.len(),
            clients = report.delivered,
            dropped = report.dropped.len(),
            "Live reload event processed"
        );
        Some(report)
    }

    /// Record a raw filesystem event into the debouncer.
    fn record_event(
        event: &Event,
        source_dir: &Path,
        watch_patterns: &[String],
        debouncer: &ChangeDebouncer,
    ) {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return;
        }

        for path in &event.paths {
            if !Self::matches_patterns(path, source_dir, watch_patterns) {
                continue;
            }

            debouncer.record(path.clone());
            tracing::debug!(path = %path.display(), kind = ?event.kind, "Recorded filesystem event");
        }
    }

    /// Check if a path under `source_dir` matches any watch pattern.
    fn matches_patterns(path: &Path, source_dir: &Path, patterns: &[String]) -> bool {
        let Ok(relative) = path.strip_prefix(source_dir) else {
            return false;
        };

        let relative_str = relative.to_string_lossy();

        patterns
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .any(|glob_pattern| glob_pattern.matches(&relative_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live_reload::{ClientId, ClientState, LiveReloadMessage};
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| (*p).to_owned()).collect()
    }

    #[test]
    fn test_matches_patterns_md_files() {
        let source_dir = PathBuf::from("/docs");
        let patterns = patterns(&["**/*.md"]);

        assert!(LiveReloadManager::matches_patterns(
            Path::new("/docs/guide.md"),
            &source_dir,
            &patterns
        ));
        assert!(LiveReloadManager::matches_patterns(
            Path::new("/docs/nested/page.md"),
            &source_dir,
            &patterns
        ));
        assert!(!LiveReloadManager::matches_patterns(
            Path::new("/docs/image.png"),
            &source_dir,
            &patterns
        ));
    }

    #[test]
    fn test_matches_patterns_outside_source_dir() {
        assert!(!LiveReloadManager::matches_patterns(
            Path::new("/other/guide.md"),
            Path::new("/docs"),
            &patterns(&["**/*.md"])
        ));
    }

    #[test]
    fn test_matches_any_of_several_patterns() {
        let patterns = patterns(&["**/*.md", "**/*.css"]);
        assert!(LiveReloadManager::matches_patterns(
            Path::new("/docs/theme/site.css"),
            Path::new("/docs"),
            &patterns
        ));
    }

    #[test]
    fn test_record_event_filters_kind_and_pattern() {
        let debouncer = ChangeDebouncer::new(Duration::ZERO);
        let source_dir = Path::new("/docs");
        let patterns = patterns(&["**/*.md"]);

        let access = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/docs/read.md"));
        let modify = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/docs/guide.md"))
            .add_path(PathBuf::from("/docs/logo.png"));
        let create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/docs/new.md"));

        for event in [&access, &modify, &create] {
            LiveReloadManager::record_event(event, source_dir, &patterns, &debouncer);
        }

        assert_eq!(
            debouncer.drain_ready(),
            vec![PathBuf::from("/docs/guide.md"), PathBuf::from("/docs/new.md")]
        );
    }

    #[test]
    fn test_default_patterns() {
        let manager =
            LiveReloadManager::new(PathBuf::from("/docs"), None, Arc::new(ClientRegistry::new()));
        assert_eq!(manager.watch_patterns, vec!["**/*.md".to_owned()]);
        assert_eq!(manager.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(manager.with_debounce_ms(5).debounce_ms, 5);
    }

    #[test]
    fn test_broadcast_settled_batches_paths() {
        let registry = ClientRegistry::new();
        let debouncer = ChangeDebouncer::new(Duration::ZERO);
        let id = ClientId::new();
        let (tx, mut rx) = mpsc::channel(16);
        registry.register(id, "/".to_owned(), tx).unwrap();

        for i in 0..20 {
            debouncer.record(PathBuf::from(format!("/docs/page-{i}.md")));
        }
        let report = LiveReloadManager::broadcast_settled(&debouncer, &registry).unwrap();

        assert_eq!(report.delivered, 1);
        assert!(report.dropped.is_empty());
        assert_eq!(registry.state(id), ClientState::Active);
        assert_eq!(registry.len(), 1);
        assert!(matches!(rx.try_recv(), Ok(LiveReloadMessage::Info { .. })));
        assert_eq!(rx.try_recv().unwrap(), LiveReloadMessage::Reload);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_settled_nothing_ready() {
        let registry = ClientRegistry::new();
        let debouncer = ChangeDebouncer::new(Duration::from_secs(60));
        debouncer.record(PathBuf::from("/docs/guide.md"));

        assert!(LiveReloadManager::broadcast_settled(&debouncer, &registry).is_none());
        assert!(debouncer.next_deadline().is_some());
    }

    #[tokio::test]
    async fn test_start_broadcasts_on_file_change() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(ClientRegistry::new());
        let mut manager = LiveReloadManager::new(
            dir.path().to_path_buf(),
            None,
            Arc::clone(&registry),
        )
        .with_debounce_ms(10);
        manager.start().unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        registry
            .register(ClientId::new(), "/".to_owned(), tx)
            .unwrap();
        assert!(matches!(
            rx.recv().await,
            Some(LiveReloadMessage::Info { .. })
        ));

        std::fs::write(dir.path().join("guide.md"), "# Guide\n").unwrap();

        let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("reload within timeout");
        assert_eq!(message, Some(LiveReloadMessage::Reload));
    }
}
