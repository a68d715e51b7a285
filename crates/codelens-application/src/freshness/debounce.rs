//! Per-codebase last-sync bookkeeping, factored out of the coordinator so its
//! throttling rule can be tested in isolation (mirrors the teacher's
//! `DebounceService` split out of the sync manager).

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Tracks the last successful full-sync time per codebase path.
#[derive(Default)]
pub struct Debouncer {
    last_sync_at: DashMap<PathBuf, Instant>,
}

impl Debouncer {
    /// Build an empty debouncer.
    pub fn new() -> Self {
        Self {
            last_sync_at: DashMap::new(),
        }
    }

    /// Whether a sync for `path` happened less than `threshold_ms` ago.
    /// `threshold_ms == 0` disables throttling entirely.
    pub fn is_throttled(&self, path: &Path, threshold_ms: u64) -> bool {
        if threshold_ms == 0 {
            return false;
        }
        self.last_sync_at
            .get(path)
            .is_some_and(|last| last.elapsed() < Duration::from_millis(threshold_ms))
    }

    /// Record that a sync for `path` just completed.
    pub fn record(&self, path: &Path) {
        self.last_sync_at.insert(path.to_path_buf(), Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_path_is_never_throttled() {
        let debouncer = Debouncer::new();
        assert!(!debouncer.is_throttled(Path::new("/repo"), 60_000));
    }

    #[test]
    fn recorded_path_is_throttled_within_window() {
        let debouncer = Debouncer::new();
        debouncer.record(Path::new("/repo"));
        assert!(debouncer.is_throttled(Path::new("/repo"), 60_000));
        assert!(!debouncer.is_throttled(Path::new("/repo"), 0));
    }
}
