//! Shared fingerprint gate and stale-local completion-proof check, consumed by
//! every read-path tool handler use case (spec.md §4.1 "Stale-local detection").

use codelens_domain::ports::VectorStorePort;
use codelens_domain::value_objects::{CodebaseStatus, IndexFingerprint, ReindexReason, collection_name_for};
use std::path::Path;
use std::sync::Arc;

use crate::snapshot::SnapshotStore;

/// Outcome of the combined fingerprint-gate + stale-local check a tool call
/// must pass before touching the search pipeline, outline provider, or
/// call-graph provider.
pub enum AccessGate {
    /// The codebase is not tracked at all.
    NotIndexed,
    /// An index run is currently in progress.
    Indexing { percentage: u8 },
    /// The stored fingerprint no longer matches the runtime fingerprint.
    RequiresReindex {
        runtime_fingerprint: IndexFingerprint,
        indexed_fingerprint: Option<IndexFingerprint>,
        reason: ReindexReason,
    },
    /// Status claims indexed but the vector store has no valid completion marker.
    StaleLocal { reason: &'static str },
    /// A transient probe failure while checking the completion marker; status unchanged.
    ProbeFailed,
    /// The codebase is queryable.
    Ready,
}

/// Run the fingerprint gate, then (if it allows access) the stale-local
/// completion-proof check against the vector store's marker document.
pub async fn check_access(
    snapshot: &SnapshotStore,
    vector_store: &Arc<dyn VectorStorePort>,
    path: &Path,
    runtime_fingerprint: &IndexFingerprint,
) -> AccessGate {
    let Some(info) = snapshot.get_info(path).await else {
        return AccessGate::NotIndexed;
    };

    if let CodebaseStatus::Indexing { indexing_percentage, .. } = info.status {
        return AccessGate::Indexing { percentage: indexing_percentage };
    }

    let gate = snapshot
        .ensure_fingerprint_compatibility_on_access(path, runtime_fingerprint)
        .await;
    if !gate.allowed {
        let info = snapshot.get_info(path).await;
        return match info.as_ref().map(|i| &i.status) {
            Some(CodebaseStatus::RequiresReindex { index_fingerprint, reindex_reason, .. }) => {
                AccessGate::RequiresReindex {
                    runtime_fingerprint: runtime_fingerprint.clone(),
                    indexed_fingerprint: index_fingerprint.clone(),
                    reason: *reindex_reason,
                }
            }
            _ => AccessGate::NotIndexed,
        };
    }

    if !info.status.is_queryable() {
        return AccessGate::Ready;
    }

    let collection = collection_name_for(path);
    match vector_store.get_completion_marker(&collection).await {
        Err(_) => AccessGate::ProbeFailed,
        Ok(None) => AccessGate::StaleLocal { reason: "missing_marker_doc" },
        Ok(Some(marker)) if !marker.is_valid() => AccessGate::StaleLocal { reason: "invalid_marker_payload" },
        Ok(Some(marker)) if marker.fingerprint != *runtime_fingerprint => {
            snapshot
                .set_requires_reindex(
                    path,
                    ReindexReason::FingerprintMismatch,
                    Some(marker.fingerprint.clone()),
                    "completion marker fingerprint no longer matches the runtime fingerprint".to_string(),
                )
                .await;
            AccessGate::RequiresReindex {
                runtime_fingerprint: runtime_fingerprint.clone(),
                indexed_fingerprint: Some(marker.fingerprint),
                reason: ReindexReason::FingerprintMismatch,
            }
        }
        Ok(Some(_)) => AccessGate::Ready,
    }
}

/// Decide the interrupted-indexing recovery outcome for a stale `indexing`
/// entry (spec.md §4.1 "Interrupted-indexing recovery").
pub enum RecoveryDecision {
    PromoteIndexed,
    MarkFailed { reason: &'static str },
}

pub async fn decide_recovery(
    vector_store: &Arc<dyn VectorStorePort>,
    path: &Path,
    runtime_fingerprint: &IndexFingerprint,
) -> RecoveryDecision {
    let collection = collection_name_for(path);
    match vector_store.get_completion_marker(&collection).await {
        Ok(Some(marker)) if marker.is_valid() && marker.fingerprint == *runtime_fingerprint => {
            RecoveryDecision::PromoteIndexed
        }
        Ok(Some(marker)) if marker.is_valid() => RecoveryDecision::MarkFailed { reason: "fingerprint_mismatch" },
        Ok(Some(_)) => RecoveryDecision::MarkFailed { reason: "invalid_marker_payload" },
        Ok(None) => RecoveryDecision::MarkFailed { reason: "missing_marker" },
        Err(_) => RecoveryDecision::MarkFailed { reason: "missing_marker" },
    }
}
