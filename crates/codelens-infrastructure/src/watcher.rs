//! Per-codebase filesystem watchers, debounced event coalescing, and the
//! `shouldIgnoreWatchPath` event filter (spec.md §4.3). Shaped after the
//! teacher's `ContextDaemon` background-task lifecycle (an `AtomicBool`
//! enable flag plus one task per watched resource instead of a polling
//! loop), feeding each watcher's raw events into its own debounce task.

use codelens_application::freshness::{EnsureFreshnessOptions, FreshnessCoordinator};
use codelens_application::snapshot::SnapshotStore;
use codelens_domain::constants::IGNORE_CONTROL_FILES;
use codelens_domain::ports::{IgnoreMatcherFactory, IgnoreMatcherPort};
use codelens_domain::value_objects::CodebaseStatus;
use dashmap::DashMap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How a raw filesystem event classifies against `shouldIgnoreWatchPath`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchEventKind {
    /// Drop the event: outside the root, hidden, or ignore-matched.
    Ignored,
    /// A root-level ignore control file changed; routes to ignore reconcile.
    ControlFileEdit,
    /// An ordinary qualifying edit.
    Normal,
}

/// Classify `absolute_path` under `codebase_root` per spec.md §4.3.
fn classify_watch_path(codebase_root: &Path, absolute_path: &Path, matcher: &dyn IgnoreMatcherPort) -> WatchEventKind {
    let Ok(relative) = absolute_path.strip_prefix(codebase_root) else {
        return WatchEventKind::Ignored;
    };
    let relative_str = relative.to_string_lossy().replace('\\', "/");
    if relative_str.is_empty() || relative_str.starts_with("..") {
        return WatchEventKind::Ignored;
    }

    if IGNORE_CONTROL_FILES.contains(&relative_str.as_str()) {
        return WatchEventKind::ControlFileEdit;
    }

    let has_hidden_segment = relative
        .components()
        .any(|c| matches!(c, Component::Normal(s) if s.to_string_lossy().starts_with('.')));
    if has_hidden_segment {
        return WatchEventKind::Ignored;
    }

    let with_trailing_slash = format!("{relative_str}/");
    if matcher.is_ignored(&relative_str) || matcher.is_ignored(&with_trailing_slash) {
        return WatchEventKind::Ignored;
    }

    WatchEventKind::Normal
}

fn is_enospc(err: &notify::Error) -> bool {
    matches!(&err.kind, notify::ErrorKind::Io(io_err) if io_err.raw_os_error() == Some(28))
}

struct WatcherHandle {
    _watcher: RecommendedWatcher,
    debounce_task: JoinHandle<()>,
}

/// Owns one filesystem watcher and one debounce task per watched codebase.
pub struct WatcherSubsystem {
    freshness: Arc<FreshnessCoordinator>,
    snapshot: Arc<SnapshotStore>,
    ignore_factory: Arc<dyn IgnoreMatcherFactory>,
    debounce_ms: u64,
    handles: DashMap<PathBuf, WatcherHandle>,
    enabled: Arc<AtomicBool>,
}

impl WatcherSubsystem {
    /// Construct a subsystem with no watchers registered yet.
    pub fn new(
        freshness: Arc<FreshnessCoordinator>,
        snapshot: Arc<SnapshotStore>,
        ignore_factory: Arc<dyn IgnoreMatcherFactory>,
        debounce_ms: u64,
    ) -> Self {
        Self {
            freshness,
            snapshot,
            ignore_factory,
            debounce_ms,
            handles: DashMap::new(),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Spawn a watcher for every codebase currently `{indexed, sync_completed}`.
    pub async fn start(&self) {
        for info in self.snapshot.get_all().await {
            if info.status.is_queryable() {
                self.register_codebase_watcher(&info.path).await;
            }
        }
    }

    /// Register a watcher for `path`, if watcher mode is enabled and it isn't
    /// already registered. A no-op after a global ENOSPC disable.
    pub async fn register_codebase_watcher(&self, path: &Path) {
        if !self.enabled.load(Ordering::Relaxed) || self.handles.contains_key(path) {
            return;
        }

        let matcher: Arc<dyn IgnoreMatcherPort> = Arc::from(self.ignore_factory.build(path, &[]));
        let (tx, rx) = mpsc::unbounded_channel::<PathBuf>();

        let enabled = Arc::clone(&self.enabled);
        let tx_for_events = tx.clone();
        let watch_result = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for changed in event.paths {
                    let _ = tx_for_events.send(changed);
                }
            }
            Err(err) => {
                if is_enospc(&err) {
                    tracing::error!("[WATCH] ENOSPC while watching, disabling watcher mode globally");
                    enabled.store(false, Ordering::SeqCst);
                } else {
                    tracing::warn!(error = %err, "[WATCH] watcher error");
                }
            }
        });

        let mut watcher = match watch_result {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "[WATCH] failed to create watcher");
                return;
            }
        };

        if let Err(err) = watcher.watch(path, RecursiveMode::Recursive) {
            tracing::warn!(error = %err, path = %path.display(), "[WATCH] failed to watch path");
            return;
        }

        let freshness = Arc::clone(&self.freshness);
        let snapshot = Arc::clone(&self.snapshot);
        let debounce_ms = self.debounce_ms;
        let root = path.to_path_buf();
        let debounce_task = tokio::spawn(async move {
            run_debounce_loop(root, rx, matcher, freshness, snapshot, debounce_ms).await;
        });

        self.handles.insert(path.to_path_buf(), WatcherHandle { _watcher: watcher, debounce_task });
    }

    /// Tear down the watcher and debounce task for `path`, if any.
    pub fn unregister_codebase_watcher(&self, path: &Path) {
        if let Some((_, handle)) = self.handles.remove(path) {
            handle.debounce_task.abort();
        }
    }

    /// Close all watchers and clear all debounce timers.
    pub fn stop(&self) {
        for entry in self.handles.iter() {
            entry.value().debounce_task.abort();
        }
        self.handles.clear();
    }

    /// Whether watcher mode is still active (`false` after an ENOSPC disable).
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

async fn run_debounce_loop(
    root: PathBuf,
    mut rx: mpsc::UnboundedReceiver<PathBuf>,
    matcher: Arc<dyn IgnoreMatcherPort>,
    freshness: Arc<FreshnessCoordinator>,
    snapshot: Arc<SnapshotStore>,
    debounce_ms: u64,
) {
    while let Some(first) = rx.recv().await {
        let mut coalesced_edits = 0usize;
        let mut ignore_change = false;
        if !accumulate(&root, &first, matcher.as_ref(), &mut coalesced_edits, &mut ignore_change) {
            continue;
        }

        loop {
            match tokio::time::timeout(Duration::from_millis(debounce_ms), rx.recv()).await {
                Ok(Some(next)) => {
                    accumulate(&root, &next, matcher.as_ref(), &mut coalesced_edits, &mut ignore_change);
                }
                Ok(None) => return,
                Err(_elapsed) => break,
            }
        }

        let still_watchable = matches!(
            snapshot.get_status(&root).await,
            Some(status) if status.is_queryable()
        );
        if !still_watchable {
            continue;
        }

        let opts = if ignore_change {
            EnsureFreshnessOptions::ignore_change(coalesced_edits)
        } else {
            EnsureFreshnessOptions::default()
        };
        let decision = freshness.ensure_freshness(&root, 0, opts).await;
        tracing::info!(
            path = %root.display(),
            mode = ?decision.mode,
            coalesced_edits,
            "[WATCH] debounce fired"
        );
    }
}

fn accumulate(
    root: &Path,
    absolute: &Path,
    matcher: &dyn IgnoreMatcherPort,
    coalesced_edits: &mut usize,
    ignore_change: &mut bool,
) -> bool {
    match classify_watch_path(root, absolute, matcher) {
        WatchEventKind::Ignored => false,
        WatchEventKind::Normal => {
            *coalesced_edits += 1;
            true
        }
        WatchEventKind::ControlFileEdit => {
            *coalesced_edits += 1;
            *ignore_change = true;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AllowAll;
    impl IgnoreMatcherPort for AllowAll {
        fn is_ignored(&self, _relative_path: &str) -> bool {
            false
        }
    }

    struct DenyAll;
    impl IgnoreMatcherPort for DenyAll {
        fn is_ignored(&self, _relative_path: &str) -> bool {
            true
        }
    }

    #[test]
    fn outside_root_is_ignored() {
        let kind = classify_watch_path(Path::new("/repo"), Path::new("/other/file.rs"), &AllowAll);
        assert_eq!(kind, WatchEventKind::Ignored);
    }

    #[test]
    fn control_files_are_allow_listed_and_classified() {
        let kind = classify_watch_path(Path::new("/repo"), Path::new("/repo/.gitignore"), &DenyAll);
        assert_eq!(kind, WatchEventKind::ControlFileEdit);
    }

    #[test]
    fn hidden_segment_is_ignored() {
        let kind = classify_watch_path(Path::new("/repo"), Path::new("/repo/.git/HEAD"), &AllowAll);
        assert_eq!(kind, WatchEventKind::Ignored);
    }

    #[test]
    fn ignored_by_matcher_is_dropped() {
        let kind = classify_watch_path(Path::new("/repo"), Path::new("/repo/node_modules/x.js"), &DenyAll);
        assert_eq!(kind, WatchEventKind::Ignored);
    }

    #[test]
    fn ordinary_path_is_normal() {
        let kind = classify_watch_path(Path::new("/repo"), Path::new("/repo/src/main.rs"), &AllowAll);
        assert_eq!(kind, WatchEventKind::Normal);
    }
}
