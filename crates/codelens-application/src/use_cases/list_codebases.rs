//! `list_codebases` use case: grouped summary by status (spec.md §6).

use codelens_domain::value_objects::CodebaseInfo;
use std::sync::Arc;

use crate::snapshot::SnapshotStore;

/// Codebases grouped by status-kind tag.
#[derive(Debug, Clone, Default)]
pub struct ListCodebasesOutcome {
    pub not_found: Vec<CodebaseInfo>,
    pub indexing: Vec<CodebaseInfo>,
    pub indexed: Vec<CodebaseInfo>,
    pub sync_completed: Vec<CodebaseInfo>,
    pub requires_reindex: Vec<CodebaseInfo>,
    pub indexfailed: Vec<CodebaseInfo>,
}

pub struct ListCodebasesUseCase {
    snapshot: Arc<SnapshotStore>,
}

impl ListCodebasesUseCase {
    pub fn new(snapshot: Arc<SnapshotStore>) -> Self {
        Self { snapshot }
    }

    pub async fn execute(&self) -> ListCodebasesOutcome {
        let mut outcome = ListCodebasesOutcome::default();
        for info in self.snapshot.get_all().await {
            match info.status.kind() {
                "not_found" => outcome.not_found.push(info),
                "indexing" => outcome.indexing.push(info),
                "indexed" => outcome.indexed.push(info),
                "sync_completed" => outcome.sync_completed.push(info),
                "requires_reindex" => outcome.requires_reindex.push(info),
                _ => outcome.indexfailed.push(info),
            }
        }
        outcome
    }
}
