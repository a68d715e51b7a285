//! Decision and option types for [`super::FreshnessCoordinator::ensure_freshness`].

use codelens_domain::value_objects::SyncDelta;

/// Reason accompanying an `ensureFreshness` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessReason {
    /// The watcher detected an edit to a root-level ignore control file.
    IgnoreChange,
}

/// Options accompanying an `ensureFreshness` call (spec.md §4.2).
#[derive(Debug, Clone, Default)]
pub struct EnsureFreshnessOptions {
    /// Forces the ignore-reconcile branch directly.
    pub reason: Option<FreshnessReason>,
    /// Skip the ignore-control signature comparison (used by the reconcile's
    /// own follow-up sync, spec.md §4.2.b step 7).
    pub skip_ignore_control_check: bool,
    /// Number of watcher events coalesced into this call, for diagnostics.
    pub coalesced_edits: usize,
}

impl EnsureFreshnessOptions {
    /// The options the watcher debounce timer uses for an ignore-control edit.
    pub fn ignore_change(coalesced_edits: usize) -> Self {
        Self {
            reason: Some(FreshnessReason::IgnoreChange),
            skip_ignore_control_check: false,
            coalesced_edits,
        }
    }
}

/// The closed set of `ensureFreshness` outcomes (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessMode {
    /// A full sync ran to completion.
    Synced,
    /// Throttled: a sync happened too recently.
    SkippedRecent,
    /// Coalesced onto an in-flight sync or reconcile.
    Coalesced,
    /// Skipped because the codebase is currently `indexing`.
    SkippedIndexing,
    /// Skipped because the codebase is `requires_reindex`.
    SkippedRequiresReindex,
    /// Skipped and the codebase entry removed because its directory is gone.
    SkippedMissingPath,
    /// An ignore-rule reconcile ran to completion.
    ReconciledIgnoreChange,
    /// The ignore-rule reload failed; a best-effort fallback sync may have run.
    IgnoreReloadFailed,
}

/// Result of an `ensureFreshness` call. Only the fields relevant to `mode` are populated.
#[derive(Debug, Clone)]
pub struct FreshnessDecision {
    /// Which branch produced this decision.
    pub mode: FreshnessMode,
    /// Sync delta counters, present when `mode == Synced`.
    pub stats: Option<SyncDelta>,
    /// Relative paths that changed, present when `mode == Synced`.
    pub changed_files: Vec<String>,
    /// New `ignoreRulesVersion`, present when `mode == ReconciledIgnoreChange`.
    pub ignore_rules_version: Option<u64>,
    /// Count of self-healing deletes, present when `mode == ReconciledIgnoreChange`.
    pub deleted_files: Option<usize>,
    /// Count of paths newly classified as ignored, present when `mode == ReconciledIgnoreChange`.
    pub newly_ignored_files: Option<usize>,
    /// Count of paths picked up by the follow-up sync, present when `mode == ReconciledIgnoreChange`.
    pub added_files: Option<usize>,
    /// Number of watcher edits this reconcile coalesced, echoed from the request.
    pub coalesced_edits: Option<usize>,
    /// Wall-clock duration of the reconcile, present when `mode == ReconciledIgnoreChange`.
    pub duration_ms: Option<u64>,
    /// Whether a best-effort fallback sync ran, present when `mode == IgnoreReloadFailed`.
    pub fallback_sync_executed: Option<bool>,
    /// Explanation, present when `mode == IgnoreReloadFailed` or a transient sync failure occurred.
    pub error_message: Option<String>,
}

impl FreshnessDecision {
    fn empty(mode: FreshnessMode) -> Self {
        Self {
            mode,
            stats: None,
            changed_files: Vec::new(),
            ignore_rules_version: None,
            deleted_files: None,
            newly_ignored_files: None,
            added_files: None,
            coalesced_edits: None,
            duration_ms: None,
            fallback_sync_executed: None,
            error_message: None,
        }
    }

    /// A full sync completed.
    pub fn synced(stats: SyncDelta, changed_files: Vec<String>) -> Self {
        Self {
            stats: Some(stats),
            changed_files,
            ..Self::empty(FreshnessMode::Synced)
        }
    }

    /// A full sync was attempted but the indexer call itself failed transiently;
    /// status is left unchanged so the next attempt can retry (spec.md §7 "degrade
    /// to the nearest well-defined status" — reported as `synced` with an error
    /// attached rather than inventing a mode outside the closed set).
    pub fn synced_failed(error_message: String) -> Self {
        Self {
            stats: Some(SyncDelta::default()),
            error_message: Some(error_message),
            ..Self::empty(FreshnessMode::Synced)
        }
    }

    /// Throttled.
    pub fn skipped_recent() -> Self {
        Self::empty(FreshnessMode::SkippedRecent)
    }

    /// Currently indexing.
    pub fn skipped_indexing() -> Self {
        Self::empty(FreshnessMode::SkippedIndexing)
    }

    /// Currently requires reindex.
    pub fn skipped_requires_reindex() -> Self {
        Self::empty(FreshnessMode::SkippedRequiresReindex)
    }

    /// Directory no longer exists.
    pub fn skipped_missing_path() -> Self {
        Self::empty(FreshnessMode::SkippedMissingPath)
    }

    /// An ignore-rule reconcile completed.
    #[allow(clippy::too_many_arguments)]
    pub fn reconciled(
        ignore_rules_version: u64,
        deleted_files: usize,
        newly_ignored_files: usize,
        added_files: usize,
        coalesced_edits: usize,
        duration_ms: u64,
    ) -> Self {
        Self {
            ignore_rules_version: Some(ignore_rules_version),
            deleted_files: Some(deleted_files),
            newly_ignored_files: Some(newly_ignored_files),
            added_files: Some(added_files),
            coalesced_edits: Some(coalesced_edits),
            duration_ms: Some(duration_ms),
            ..Self::empty(FreshnessMode::ReconciledIgnoreChange)
        }
    }

    /// Ignore reload failed.
    pub fn ignore_reload_failed(fallback_sync_executed: bool, error_message: String) -> Self {
        Self {
            fallback_sync_executed: Some(fallback_sync_executed),
            error_message: Some(error_message),
            ..Self::empty(FreshnessMode::IgnoreReloadFailed)
        }
    }

    /// Reinterpret this decision as having been observed by a coalesced caller:
    /// same fields, `mode` forced to `Coalesced` (spec.md §4.2.b: "concurrent
    /// calls return `{mode: coalesced, …}` with the fields of the winning reconcile").
    pub fn as_coalesced(mut self) -> Self {
        self.mode = FreshnessMode::Coalesced;
        self
    }
}
