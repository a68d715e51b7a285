//! Index completion marker — the distinguished document stored in a codebase's
//! vector collection as proof that a full index completed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fingerprint::IndexFingerprint;

/// The reserved `kind` value every valid completion marker carries.
pub const COMPLETION_MARKER_KIND: &str = "index_completion_v1";

/// Reserved document id under which the marker is stored in the codebase's collection.
pub const COMPLETION_MARKER_DOC_ID: &str = "__codelens_index_completion__";

/// Reserved `fileExtension` value used to exclude the marker from search results;
/// every `hybridSearch` call must append `fileExtension != RESERVED_MARKER_EXTENSION`.
pub const RESERVED_MARKER_EXTENSION: &str = "__codelens_marker__";

/// The completion-marker document itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexCompletionMarker {
    /// Always [`COMPLETION_MARKER_KIND`]
    pub kind: String,
    /// Absolute codebase path the marker proves completion for
    pub codebase_path: String,
    /// Fingerprint of the index that completed
    pub fingerprint: IndexFingerprint,
    /// Number of files indexed
    pub indexed_files: u64,
    /// Number of chunks indexed
    pub total_chunks: u64,
    /// When the index run completed
    pub completed_at: DateTime<Utc>,
    /// Identifier of the index run that produced this marker
    pub run_id: String,
}

impl IndexCompletionMarker {
    /// The validity predicate from spec.md §3: known kind, non-empty path,
    /// non-negative counters, parseable timestamp (guaranteed by the type),
    /// non-empty run id.
    ///
    /// Counters are unsigned so "non-negative" is a type-level guarantee; this
    /// only checks the remaining conditions.
    pub fn is_valid(&self) -> bool {
        self.kind == COMPLETION_MARKER_KIND
            && !self.codebase_path.is_empty()
            && !self.run_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: &str, path: &str, run_id: &str) -> IndexCompletionMarker {
        IndexCompletionMarker {
            kind: kind.to_string(),
            codebase_path: path.to_string(),
            fingerprint: IndexFingerprint {
                embedding_provider: "p".into(),
                embedding_model: "m".into(),
                embedding_dimension: 768,
                vector_store_provider: "v".into(),
                schema_version: "1".into(),
            },
            indexed_files: 10,
            total_chunks: 100,
            completed_at: Utc::now(),
            run_id: run_id.to_string(),
        }
    }

    #[test]
    fn valid_marker_passes() {
        assert!(sample(COMPLETION_MARKER_KIND, "/repo", "run-1").is_valid());
    }

    #[test]
    fn wrong_kind_or_empty_fields_fail() {
        assert!(!sample("other_kind", "/repo", "run-1").is_valid());
        assert!(!sample(COMPLETION_MARKER_KIND, "", "run-1").is_valid());
        assert!(!sample(COMPLETION_MARKER_KIND, "/repo", "").is_valid());
    }
}
