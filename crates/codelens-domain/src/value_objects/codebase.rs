//! Codebase status state machine and per-codebase info.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::fingerprint::{FingerprintSource, IndexFingerprint};

/// Why an `indexed`/`sync_completed` codebase was moved to `requires_reindex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReindexReason {
    /// The stored fingerprint no longer matches the runtime fingerprint.
    FingerprintMismatch,
    /// The completion marker document could not be found in the vector store.
    MissingMarkerDoc,
    /// The completion-marker probe itself failed transiently.
    ProbeFailed,
    /// A caller explicitly requested a reindex.
    Manual,
}

/// `indexed.indexStatus`: whether the index covers every file or was capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexCompleteness {
    /// Every discovered file was indexed.
    Completed,
    /// A size/count limit was reached before all files were indexed.
    LimitReached,
}

/// Counters recorded by a `sync_completed` transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDelta {
    /// Files newly added to the index
    pub added: u64,
    /// Files removed from the index
    pub removed: u64,
    /// Files re-indexed because their content changed
    pub modified: u64,
}

/// Ordered set of relative paths the indexer has placed into the vector store
/// for a codebase. Iteration order is insertion order (a `BTreeSet` is used for
/// deterministic persistence; ordering among equal-weight operations does not
/// carry meaning beyond determinism).
pub type IndexManifest = BTreeSet<String>;

/// The tagged variant of a codebase's lifecycle status, carrying only the
/// fields meaningful for that variant (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CodebaseStatus {
    /// The path has never been indexed (or was cleared).
    NotFound,
    /// A background index run is in progress.
    Indexing {
        /// Progress in `[0, 100]`
        indexing_percentage: u8,
        /// Last time this status was updated
        last_updated: DateTime<Utc>,
    },
    /// A completed, up-to-date index exists.
    Indexed {
        /// Number of files represented in the index
        indexed_files: u64,
        /// Number of chunks in the index
        total_chunks: u64,
        /// Whether the index is complete or capped
        index_status: IndexCompleteness,
        /// Last time this status was updated
        last_updated: DateTime<Utc>,
        /// The fingerprint the index was built with
        index_fingerprint: IndexFingerprint,
        /// How `index_fingerprint` was obtained
        fingerprint_source: FingerprintSource,
    },
    /// An incremental sync completed on top of a prior `indexed` state.
    SyncCompleted {
        /// Change counters from the sync
        delta: SyncDelta,
        /// Last time this status was updated
        last_updated: DateTime<Utc>,
        /// The fingerprint the index was built with
        index_fingerprint: IndexFingerprint,
        /// How `index_fingerprint` was obtained
        fingerprint_source: FingerprintSource,
    },
    /// The local index is no longer usable and must be rebuilt.
    RequiresReindex {
        /// Human-readable explanation
        message: String,
        /// Last time this status was updated
        last_updated: DateTime<Utc>,
        /// The fingerprint that triggered (or was active at) the transition, if known
        index_fingerprint: Option<IndexFingerprint>,
        /// Why the reindex is required
        reindex_reason: ReindexReason,
    },
    /// The background index run failed.
    IndexFailed {
        /// Error message from the failed attempt
        error_message: String,
        /// Progress reached before failing, if known
        last_attempted_percentage: Option<u8>,
        /// Last time this status was updated
        last_updated: DateTime<Utc>,
    },
}

impl CodebaseStatus {
    /// Short discriminant name matching the wire/status vocabulary in spec.md §3.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Indexing { .. } => "indexing",
            Self::Indexed { .. } => "indexed",
            Self::SyncCompleted { .. } => "sync_completed",
            Self::RequiresReindex { .. } => "requires_reindex",
            Self::IndexFailed { .. } => "indexfailed",
        }
    }

    /// Whether tool calls should treat this codebase as having queryable content
    /// (`indexed` or `sync_completed`).
    pub fn is_queryable(&self) -> bool {
        matches!(self, Self::Indexed { .. } | Self::SyncCompleted { .. })
    }

    /// The fingerprint recorded against this status, if the variant carries one.
    pub fn fingerprint(&self) -> Option<&IndexFingerprint> {
        match self {
            Self::Indexed { index_fingerprint, .. } | Self::SyncCompleted { index_fingerprint, .. } => {
                Some(index_fingerprint)
            }
            Self::RequiresReindex { index_fingerprint, .. } => index_fingerprint.as_ref(),
            _ => None,
        }
    }
}

/// Full per-codebase tracked state: the tagged status plus the cross-variant
/// bookkeeping fields every status carries once a codebase has been created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodebaseInfo {
    /// Absolute, normalized codebase root path
    pub path: PathBuf,
    /// The tagged status and its variant-specific fields
    pub status: CodebaseStatus,
    /// Ordered set of relative paths currently represented in the vector store
    #[serde(default)]
    pub index_manifest: IndexManifest,
    /// Monotonically non-decreasing ignore-rule generation counter
    #[serde(default)]
    pub ignore_rules_version: u64,
    /// Opaque signature of the root-level ignore control files, if computed yet
    #[serde(default)]
    pub ignore_control_signature: Option<String>,
}

impl CodebaseInfo {
    /// Construct the initial `indexing` record created by `manage_index create`.
    pub fn new_indexing(path: PathBuf, now: DateTime<Utc>) -> Self {
        Self {
            path,
            status: CodebaseStatus::Indexing {
                indexing_percentage: 0,
                last_updated: now,
            },
            index_manifest: IndexManifest::new(),
            ignore_rules_version: 0,
            ignore_control_signature: None,
        }
    }
}

/// Normalize an absolute filesystem path per spec.md §3 ("Codebase path"):
/// absolute, no trailing separator.
pub fn normalize_codebase_path(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    let trimmed = s.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        PathBuf::from("/")
    } else {
        PathBuf::from(trimmed)
    }
}

/// Derive the vector-store collection name for a codebase path. Shared by the
/// indexer, the vector-store adapter, and the search pipeline so all three
/// agree on where a codebase's chunks and completion marker live.
pub fn collection_name_for(path: &Path) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    normalize_codebase_path(path).to_string_lossy().hash(&mut hasher);
    format!("codelens_{:x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_separator() {
        assert_eq!(
            normalize_codebase_path(Path::new("/repo/foo/")),
            PathBuf::from("/repo/foo")
        );
        assert_eq!(
            normalize_codebase_path(Path::new("/repo/foo")),
            PathBuf::from("/repo/foo")
        );
    }

    #[test]
    fn status_kind_matches_wire_vocabulary() {
        let now = Utc::now();
        assert_eq!(
            CodebaseStatus::Indexing {
                indexing_percentage: 10,
                last_updated: now,
            }
            .kind(),
            "indexing"
        );
        assert_eq!(CodebaseStatus::NotFound.kind(), "not_found");
    }
}
