//! Indexer port — the external file-to-chunk indexing pipeline collaborator
//! (AST splitting, embedding, and vector-store writes), explicitly out of
//! scope for this coordinator (spec.md §1) but depended on through this
//! narrow contract (spec.md §6 "Indexer contract").

use crate::error::Result;
use crate::value_objects::{IndexCompleteness, IndexFingerprint};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result of a full `index_codebase` run.
#[derive(Debug, Clone)]
pub struct IndexOutcome {
    /// Number of files indexed
    pub indexed_files: u64,
    /// Number of chunks produced
    pub total_chunks: u64,
    /// Whether the run completed fully or hit a limit
    pub status: IndexCompleteness,
}

/// Result of an incremental `reindex_by_change` run.
#[derive(Debug, Clone, Default)]
pub struct ReindexOutcome {
    /// Files newly added
    pub added: u64,
    /// Files removed
    pub removed: u64,
    /// Files re-indexed due to content changes
    pub modified: u64,
    /// Relative paths that changed in this run
    pub changed_files: Vec<String>,
}

/// Progress callback invoked during a full index run; percentage in `[0, 100]`.
pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

/// The indexing pipeline collaborator contract.
#[async_trait]
pub trait IndexerPort: Send + Sync {
    /// Run a full index of `path`, reporting progress through `progress`.
    async fn index_codebase(&self, path: &Path, progress: ProgressCallback) -> Result<IndexOutcome>;

    /// Run an incremental re-index driven by a filesystem snapshot diff.
    async fn reindex_by_change(&self, path: &Path) -> Result<ReindexOutcome>;

    /// Whether a vector-store collection already exists for this codebase.
    async fn has_indexed_collection(&self, path: &Path) -> Result<bool>;

    /// The ignore patterns currently active for this codebase (from its ignore
    /// control files), as loaded at the last reload.
    async fn active_ignore_patterns(&self, path: &Path) -> Result<Vec<String>>;

    /// Reload ignore rules for this codebase from its current control files.
    async fn reload_ignore_rules(&self, path: &Path) -> Result<()>;

    /// Whether an internal change-synchronizer has been created for this codebase.
    fn has_synchronizer(&self, path: &Path) -> bool;

    /// Recreate the internal change-synchronizer for this codebase, if supported.
    async fn recreate_synchronizer(&self, path: &Path) -> Result<()>;

    /// Delete specific relative paths from the codebase's index (self-healing
    /// delete during ignore-rule reconcile).
    async fn delete_indexed_paths(&self, path: &Path, relative_paths: &[String]) -> Result<()>;

    /// The set of relative paths the indexer is currently tracking for this
    /// codebase (used as a manifest fallback, spec.md §4.2.b step 2).
    async fn tracked_relative_paths(&self, path: &Path) -> Result<Vec<String>>;

    /// The fingerprint this indexer would produce for a new index right now.
    fn runtime_fingerprint(&self) -> IndexFingerprint;

    /// Default splitter in use, surfaced for diagnostics only.
    fn splitter_name(&self) -> &str;
}

/// Location of a codebase's persisted snapshot directory, resolved once and
/// reused by both the snapshot store and the indexer adapter.
pub fn snapshot_dir_for(base: &Path, codebase_path: &Path) -> PathBuf {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    codebase_path.to_string_lossy().hash(&mut hasher);
    base.join(format!("{:x}", hasher.finish()))
}
