//! `FreshnessCoordinator` — the request-coalescing, throttled, ignore-change-aware
//! sync gate every tool call funnels through before touching the index (spec.md §4.2).

use codelens_domain::value_objects::{CodebaseStatus, FingerprintSource, SyncDelta};
use codelens_domain::ports::{IgnoreMatcherFactory, IndexerPort};
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::snapshot::SnapshotStore;

use super::debounce::Debouncer;
use super::signature::compute_ignore_control_signature;
use super::types::{EnsureFreshnessOptions, FreshnessDecision, FreshnessMode, FreshnessReason};

type SharedDecision = Shared<BoxFuture<'static, FreshnessDecision>>;

/// Invoked after a full sync completes successfully, e.g. to invalidate the
/// changed-files ranking cache for that codebase.
pub type SyncCompletedHook = Arc<dyn Fn(&Path) + Send + Sync>;

/// The sync gate. Must be held behind `Arc` — its reconcile path recurses into
/// `ensure_freshness` from a spawned `'static` future.
pub struct FreshnessCoordinator {
    snapshot: Arc<SnapshotStore>,
    indexer: Arc<dyn IndexerPort>,
    ignore_factory: Arc<dyn IgnoreMatcherFactory>,
    sync_inflight: DashMap<PathBuf, SharedDecision>,
    reconcile_inflight: DashMap<PathBuf, SharedDecision>,
    debouncer: Debouncer,
    on_sync_completed: Option<SyncCompletedHook>,
}

impl FreshnessCoordinator {
    /// Construct a coordinator over the given collaborators.
    pub fn new(
        snapshot: Arc<SnapshotStore>,
        indexer: Arc<dyn IndexerPort>,
        ignore_factory: Arc<dyn IgnoreMatcherFactory>,
        on_sync_completed: Option<SyncCompletedHook>,
    ) -> Self {
        Self {
            snapshot,
            indexer,
            ignore_factory,
            sync_inflight: DashMap::new(),
            reconcile_inflight: DashMap::new(),
            debouncer: Debouncer::new(),
            on_sync_completed,
        }
    }

    /// The single public entry point (spec.md §4.2).
    ///
    /// Returns a boxed future (rather than using `async fn` sugar) because this
    /// method and `execute_reconcile` recurse into each other; an opaque
    /// `impl Future` return type here would make that mutual recursion
    /// impossible for the compiler to size/prove `Send` for.
    pub fn ensure_freshness<'a>(
        self: &'a Arc<Self>,
        path: &'a Path,
        threshold_ms: u64,
        opts: EnsureFreshnessOptions,
    ) -> BoxFuture<'a, FreshnessDecision> {
        async move {
            let path = codelens_domain::value_objects::normalize_codebase_path(path);

            // Step 1: an explicit ignore-change reason jumps straight to reconcile.
            if opts.reason == Some(FreshnessReason::IgnoreChange) {
                return self.reconcile_ignore_change(&path, opts.coalesced_edits).await;
            }

            // Step 2: ignore-control signature check (may redirect into reconcile).
            if !opts.skip_ignore_control_check {
                if let Some(decision) = self.check_ignore_control_signature(&path).await {
                    return decision;
                }
            }

            // Step 3: coalesce onto an in-flight full sync, if any.
            if let Some(existing) = self.sync_inflight.get(&path) {
                let fut = existing.clone();
                drop(existing);
                return fut.await.as_coalesced();
            }

            // Step 4: throttle.
            if self.debouncer.is_throttled(&path, threshold_ms) {
                return FreshnessDecision::skipped_recent();
            }

            // Step 5: execute, registering the in-flight future before awaiting.
            self.run_full_sync(&path).await
        }
        .boxed()
    }

    async fn check_ignore_control_signature(self: &Arc<Self>, path: &Path) -> Option<FreshnessDecision> {
        let info = self.snapshot.get_info(path).await?;
        if !info.status.is_queryable() {
            return None;
        }

        let current = compute_ignore_control_signature(path).await;
        match &info.ignore_control_signature {
            None => {
                // First sight: baseline without reconciling (spec.md §9 open question).
                self.snapshot.set_ignore_control_signature(path, current).await;
                None
            }
            Some(stored) if *stored != current => {
                Some(self.reconcile_ignore_change(path, 0).await)
            }
            Some(_) => None,
        }
    }

    async fn run_full_sync(self: &Arc<Self>, path: &Path) -> FreshnessDecision {
        let snapshot = Arc::clone(&self.snapshot);
        let indexer = Arc::clone(&self.indexer);
        let hook = self.on_sync_completed.clone();
        let path_owned = path.to_path_buf();

        let mut inserted = false;
        let fut = self
            .sync_inflight
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                inserted = true;
                execute_full_sync(snapshot, indexer, path_owned, hook)
                    .boxed()
                    .shared()
            })
            .clone();

        let outcome = fut.await;

        if inserted {
            self.sync_inflight.remove(path);
            if outcome.mode == FreshnessMode::Synced && outcome.error_message.is_none() {
                self.debouncer.record(path);
            }
            outcome
        } else {
            outcome.as_coalesced()
        }
    }

    async fn reconcile_ignore_change(
        self: &Arc<Self>,
        path: &Path,
        coalesced_edits: usize,
    ) -> FreshnessDecision {
        let mut inserted = false;
        let this = Arc::clone(self);
        let path_owned = path.to_path_buf();

        let fut = self
            .reconcile_inflight
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                inserted = true;
                async move { this.execute_reconcile(&path_owned, coalesced_edits).await }
                    .boxed()
                    .shared()
            })
            .clone();

        let outcome = fut.await;

        if inserted {
            self.reconcile_inflight.remove(path);
            outcome
        } else {
            outcome.as_coalesced()
        }
    }

    async fn execute_reconcile(
        self: &Arc<Self>,
        path: &Path,
        coalesced_edits: usize,
    ) -> FreshnessDecision {
        let started = Instant::now();

        // 1. Await any full sync already in flight.
        if let Some(existing) = self.sync_inflight.get(path) {
            let fut = existing.clone();
            drop(existing);
            fut.await;
        }

        match self.try_reconcile(path, coalesced_edits, started).await {
            Ok(decision) => decision,
            Err(message) => {
                tracing::warn!(target: "sync", path = %path.display(), error = %message, "[SYNC] ignore reconcile failed, attempting fallback sync");
                let fallback = self.run_full_sync(path).await;
                let fallback_ok = fallback.mode == FreshnessMode::Synced && fallback.error_message.is_none();
                FreshnessDecision::ignore_reload_failed(fallback_ok, message)
            }
        }
    }

    async fn try_reconcile(
        self: &Arc<Self>,
        path: &Path,
        coalesced_edits: usize,
        started: Instant,
    ) -> Result<FreshnessDecision, String> {
        // 2. Capture indexedPathsBeforeReload.
        let manifest = self.snapshot.get_manifest(path).await;
        let before: Vec<String> = if !manifest.is_empty() {
            manifest.into_iter().collect()
        } else {
            self.indexer
                .tracked_relative_paths(path)
                .await
                .unwrap_or_default()
        };
        if before.is_empty() {
            return Err("missing_manifest_and_synchronizer".to_string());
        }

        // 3. Reload ignore rules; rebuild the matcher; increment the version.
        self.indexer
            .reload_ignore_rules(path)
            .await
            .map_err(|e| e.to_string())?;
        let extra_patterns = self
            .indexer
            .active_ignore_patterns(path)
            .await
            .unwrap_or_default();
        let matcher = self.ignore_factory.build(path, &extra_patterns);

        let info = self.snapshot.get_info(path).await;
        let next_version = info.as_ref().map(|i| i.ignore_rules_version).unwrap_or(0) + 1;
        self.snapshot.set_ignore_rules_version(path, next_version).await;

        // 4. Recreate the internal synchronizer if supported.
        if self.indexer.has_synchronizer(path) {
            self.indexer
                .recreate_synchronizer(path)
                .await
                .map_err(|e| e.to_string())?;
        }

        // 5. Self-healing delete.
        let to_delete: Vec<String> = before
            .iter()
            .filter(|p| matcher.is_ignored(p))
            .cloned()
            .collect();
        if !to_delete.is_empty() {
            self.indexer
                .delete_indexed_paths(path, &to_delete)
                .await
                .map_err(|e| e.to_string())?;
        }

        // 6. Update manifest to the retained set.
        let retained: Vec<String> = before
            .iter()
            .filter(|p| !matcher.is_ignored(p))
            .cloned()
            .collect();
        self.snapshot.set_index_manifest(path, retained).await;

        // 7. Follow-up sync to pick up added files.
        let follow_up = self
            .ensure_freshness(
                path,
                0,
                EnsureFreshnessOptions {
                    skip_ignore_control_check: true,
                    ..Default::default()
                },
            )
            .await;
        let added_files = follow_up.changed_files.len();

        // 8. Store the new ignore-control signature.
        let new_signature = compute_ignore_control_signature(path).await;
        self.snapshot.set_ignore_control_signature(path, new_signature).await;

        Ok(FreshnessDecision::reconciled(
            next_version,
            to_delete.len(),
            to_delete.len(),
            added_files,
            coalesced_edits,
            started.elapsed().as_millis() as u64,
        ))
    }

    /// Number of full syncs currently in flight, for diagnostics/tests.
    pub fn inflight_sync_count(&self) -> usize {
        self.sync_inflight.len()
    }
}

async fn execute_full_sync(
    snapshot: Arc<SnapshotStore>,
    indexer: Arc<dyn IndexerPort>,
    path: PathBuf,
    on_sync_completed: Option<SyncCompletedHook>,
) -> FreshnessDecision {
    match snapshot.get_status(&path).await {
        Some(CodebaseStatus::Indexing { .. }) => return FreshnessDecision::skipped_indexing(),
        Some(CodebaseStatus::RequiresReindex { .. }) => {
            return FreshnessDecision::skipped_requires_reindex();
        }
        None => return FreshnessDecision::skipped_missing_path(),
        _ => {}
    }

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        snapshot.remove_completely(&path).await;
        return FreshnessDecision::skipped_missing_path();
    }

    let reindex = match indexer.reindex_by_change(&path).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(target: "sync", path = %path.display(), error = %e, "[SYNC] reindex_by_change failed, status unchanged");
            return FreshnessDecision::synced_failed(e.to_string());
        }
    };

    if let Ok(tracked) = indexer.tracked_relative_paths(&path).await {
        snapshot.set_index_manifest(&path, tracked).await;
    }

    let delta = SyncDelta {
        added: reindex.added,
        removed: reindex.removed,
        modified: reindex.modified,
    };
    snapshot
        .set_sync_completed(&path, delta, indexer.runtime_fingerprint(), FingerprintSource::Assumed)
        .await;

    if let Some(hook) = &on_sync_completed {
        hook(&path);
    }

    FreshnessDecision::synced(delta, reindex.changed_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_domain::error::Result as DomainResult;
    use codelens_domain::ports::{IgnoreMatcherPort, IndexOutcome, ProgressCallback, ReindexOutcome};
    use codelens_domain::value_objects::{FingerprintSource as FpSource, IndexCompleteness, IndexFingerprint};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct NullIgnoreMatcher;
    impl IgnoreMatcherPort for NullIgnoreMatcher {
        fn is_ignored(&self, _relative_path: &str) -> bool {
            false
        }
    }
    struct NullIgnoreFactory;
    impl IgnoreMatcherFactory for NullIgnoreFactory {
        fn build(&self, _root: &Path, _extra: &[String]) -> Box<dyn IgnoreMatcherPort> {
            Box::new(NullIgnoreMatcher)
        }
    }

    struct CountingIndexer {
        calls: AtomicU32,
        delay_ms: u64,
    }

    #[async_trait::async_trait]
    impl IndexerPort for CountingIndexer {
        async fn index_codebase(&self, _path: &Path, _progress: ProgressCallback) -> DomainResult<IndexOutcome> {
            unimplemented!()
        }

        async fn reindex_by_change(&self, _path: &Path) -> DomainResult<ReindexOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            Ok(ReindexOutcome {
                added: 1,
                ..Default::default()
            })
        }

        async fn has_indexed_collection(&self, _path: &Path) -> DomainResult<bool> {
            Ok(true)
        }

        async fn active_ignore_patterns(&self, _path: &Path) -> DomainResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn reload_ignore_rules(&self, _path: &Path) -> DomainResult<()> {
            Ok(())
        }

        fn has_synchronizer(&self, _path: &Path) -> bool {
            false
        }

        async fn recreate_synchronizer(&self, _path: &Path) -> DomainResult<()> {
            Ok(())
        }

        async fn delete_indexed_paths(&self, _path: &Path, _relative_paths: &[String]) -> DomainResult<()> {
            Ok(())
        }

        async fn tracked_relative_paths(&self, _path: &Path) -> DomainResult<Vec<String>> {
            Ok(Vec::new())
        }

        fn runtime_fingerprint(&self) -> IndexFingerprint {
            IndexFingerprint {
                embedding_provider: "p".into(),
                embedding_model: "m".into(),
                embedding_dimension: 768,
                vector_store_provider: "v".into(),
                schema_version: "1".into(),
            }
        }

        fn splitter_name(&self) -> &str {
            "ast"
        }
    }

    struct NullStateStore;
    #[async_trait::async_trait]
    impl codelens_domain::ports::StateStoreProvider for NullStateStore {
        async fn save(&self, _key: &str, _data: &[u8]) -> DomainResult<()> {
            Ok(())
        }
        async fn load(&self, _key: &str) -> DomainResult<Option<Vec<u8>>> {
            Ok(None)
        }
        async fn delete(&self, _key: &str) -> DomainResult<()> {
            Ok(())
        }
    }

    async fn make_coordinator(delay_ms: u64) -> (Arc<FreshnessCoordinator>, Arc<CountingIndexer>, Arc<SnapshotStore>) {
        let snapshot = Arc::new(SnapshotStore::new(Arc::new(NullStateStore)));
        let indexer = Arc::new(CountingIndexer {
            calls: AtomicU32::new(0),
            delay_ms,
        });
        snapshot
            .set_indexed(
                Path::new("/repo"),
                1,
                1,
                IndexCompleteness::Completed,
                indexer.runtime_fingerprint(),
                FpSource::Verified,
            )
            .await;
        let coordinator = Arc::new(FreshnessCoordinator::new(
            Arc::clone(&snapshot),
            indexer.clone() as Arc<dyn IndexerPort>,
            Arc::new(NullIgnoreFactory),
            None,
        ));
        (coordinator, indexer, snapshot)
    }

    #[tokio::test]
    async fn concurrent_calls_coalesce_to_one_sync() {
        let (coordinator, indexer, _snapshot) = make_coordinator(50).await;

        let a = Arc::clone(&coordinator);
        let b = Arc::clone(&coordinator);
        let (r1, r2) = tokio::join!(
            a.ensure_freshness(Path::new("/repo"), 0, EnsureFreshnessOptions::default()),
            b.ensure_freshness(Path::new("/repo"), 0, EnsureFreshnessOptions::default()),
        );

        assert_eq!(indexer.calls.load(Ordering::SeqCst), 1);
        let modes = [r1.mode, r2.mode];
        assert!(modes.contains(&FreshnessMode::Synced));
        assert!(modes.contains(&FreshnessMode::Coalesced));
    }

    #[tokio::test]
    async fn second_call_within_threshold_is_skipped() {
        let (coordinator, indexer, _snapshot) = make_coordinator(0).await;

        let first = coordinator
            .ensure_freshness(Path::new("/repo"), 60_000, EnsureFreshnessOptions::default())
            .await;
        assert_eq!(first.mode, FreshnessMode::Synced);

        let second = coordinator
            .ensure_freshness(Path::new("/repo"), 60_000, EnsureFreshnessOptions::default())
            .await;
        assert_eq!(second.mode, FreshnessMode::SkippedRecent);
        assert_eq!(indexer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn indexing_status_short_circuits() {
        let (coordinator, indexer, snapshot) = make_coordinator(0).await;
        snapshot.set_indexing(Path::new("/repo"), 10).await;

        let decision = coordinator
            .ensure_freshness(Path::new("/repo"), 0, EnsureFreshnessOptions::default())
            .await;
        assert_eq!(decision.mode, FreshnessMode::SkippedIndexing);
        assert_eq!(indexer.calls.load(Ordering::SeqCst), 0);
    }
}
