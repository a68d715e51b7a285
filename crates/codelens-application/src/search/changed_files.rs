//! Changed-files ranking boost cache (spec.md §4.4 "Changed-files boost").
//!
//! Cache entries survive probe failures (last-known-good) to avoid flapping
//! the boost on a transient `git status` error.

use codelens_domain::constants::SEARCH_CHANGED_FIRST_MAX_CHANGED_FILES;
use codelens_domain::error::Error;
use codelens_domain::ports::GitStatusPort;
use moka::sync::Cache;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Deterministic additive boost applied to a candidate whose relative path is
/// in the current changed-files set.
pub const CHANGED_FILE_SCORE_BOOST: f32 = 0.05;

/// Per-codebase cache of the last-known changed-file set.
pub struct ChangedFilesCache {
    git: Arc<dyn GitStatusPort>,
    cache: Cache<PathBuf, Arc<HashSet<String>>>,
}

impl ChangedFilesCache {
    /// Build a cache backed by `git`.
    pub fn new(git: Arc<dyn GitStatusPort>) -> Self {
        Self {
            git,
            cache: Cache::new(1_024),
        }
    }

    /// Invalidate the cached entry for `path`, e.g. after a sync completes.
    pub fn invalidate(&self, path: &Path) {
        self.cache.invalidate(path);
    }

    /// Resolve the changed-file set to boost with, or `None` if the boost
    /// should be skipped entirely (threshold exceeded, or a first-time probe
    /// failure with no cached value — spec.md §9 open question: stay silent).
    pub async fn resolve(&self, codebase_root: &Path) -> Option<Arc<HashSet<String>>> {
        let fresh = self.git.changed_tracked_files(codebase_root).await;
        let set = match fresh {
            Ok(files) => {
                let set = Arc::new(files.into_iter().collect::<HashSet<_>>());
                self.cache.insert(codebase_root.to_path_buf(), Arc::clone(&set));
                set
            }
            Err(err) => match self.cache.get(codebase_root) {
                Some(cached) => {
                    log_fallback(codebase_root, &err);
                    cached
                }
                None => return None,
            },
        };

        if set.len() > SEARCH_CHANGED_FIRST_MAX_CHANGED_FILES {
            None
        } else {
            Some(set)
        }
    }
}

fn log_fallback(codebase_root: &Path, err: &Error) {
    tracing::debug!(
        target: "search",
        path = %codebase_root.display(),
        error = %err,
        "[SEARCH] git-status probe failed, using last-known changed-files set"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlakyGit {
        fail: AtomicBool,
    }

    #[async_trait]
    impl GitStatusPort for FlakyGit {
        async fn changed_tracked_files(&self, _root: &Path) -> Result<Vec<String>, Error> {
            if self.fail.load(Ordering::SeqCst) {
                Err(Error::internal("git status failed"))
            } else {
                Ok(vec!["src/a.rs".to_string()])
            }
        }
    }

    #[tokio::test]
    async fn falls_back_to_cache_on_probe_failure() {
        let git = Arc::new(FlakyGit {
            fail: AtomicBool::new(false),
        });
        let cache = ChangedFilesCache::new(git.clone());
        let first = cache.resolve(Path::new("/repo")).await.unwrap();
        assert!(first.contains("src/a.rs"));

        git.fail.store(true, Ordering::SeqCst);
        let second = cache.resolve(Path::new("/repo")).await.unwrap();
        assert!(second.contains("src/a.rs"));
    }

    #[tokio::test]
    async fn first_time_failure_with_no_cache_yields_none() {
        let git = Arc::new(FlakyGit {
            fail: AtomicBool::new(true),
        });
        let cache = ChangedFilesCache::new(git);
        assert!(cache.resolve(Path::new("/repo")).await.is_none());
    }
}
