//! Domain-wide constants tied to spec.md invariants and boundary behaviors.

/// Recognized root-level ignore control files, in the order their signature
/// is composed (spec.md §4.2.c). Nested `.gitignore` files are never consulted.
pub const IGNORE_CONTROL_FILES: &[&str] = &[".satoriignore", ".gitignore"];

/// Default filesystem watcher debounce interval, in milliseconds.
pub const DEFAULT_WATCH_DEBOUNCE_MS: u64 = 5_000;

/// Periodic full-sync loop interval, in milliseconds (~3 minutes).
pub const PERIODIC_SYNC_INTERVAL_MS: u64 = 3 * 60 * 1_000;

/// Periodic full-sync loop initial delay, in milliseconds (~5 seconds).
pub const PERIODIC_SYNC_INITIAL_DELAY_MS: u64 = 5_000;

/// Internal ceiling on `topK` widening during must-filter bounded retry.
pub const MUST_FILTER_TOPK_CEILING: usize = 140;

/// Maximum number of must-filter retries (beyond the initial query).
pub const MUST_FILTER_MAX_RETRIES: usize = 2;

/// Above this many changed files, the changed-files-first ranking boost is skipped.
pub const SEARCH_CHANGED_FIRST_MAX_CHANGED_FILES: usize = 256;

/// Diversity clamp: maximum grouped results per file.
pub const DIVERSITY_MAX_PER_FILE: usize = 2;

/// Diversity clamp: maximum grouped results per symbol.
pub const DIVERSITY_MAX_PER_SYMBOL: usize = 1;

/// Maximum line-range gap (in lines) for two same-file chunks to be merged.
pub const ADJACENT_CHUNK_MERGE_WINDOW_LINES: u32 = 20;

/// Minimum call-graph traversal depth.
pub const CALL_GRAPH_MIN_DEPTH: u8 = 1;

/// Maximum call-graph traversal depth.
pub const CALL_GRAPH_MAX_DEPTH: u8 = 3;

/// `search_codebase.limit` default when the caller omits it.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// `search_codebase.limit` ceiling; requests above this are clamped.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Candidate pool requested per pass before filters are applied.
pub const SEARCH_CANDIDATE_POOL: usize = 40;

/// Maximum candidate pool requested on the single expansion retry.
pub const SEARCH_CANDIDATE_POOL_MAX: usize = 200;
