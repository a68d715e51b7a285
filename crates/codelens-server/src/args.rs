//! Tool argument types for the MCP surface (spec.md §6 "Tools & arguments").
//!
//! These are pure wire-shape structs: plain strings/options, validated at the
//! protocol boundary and mapped into domain request types inside each handler.
//! Keeping enum parsing in the handlers (rather than on these structs) keeps
//! `codelens-domain` free of a `schemars`/`validator` dependency.

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

fn default_limit() -> usize {
    10
}

fn default_depth() -> u8 {
    1
}

fn default_call_graph_limit() -> usize {
    50
}

fn validate_nonempty_path(path: &str) -> Result<(), validator::ValidationError> {
    if path.trim().is_empty() {
        return Err(validator::ValidationError::new("path cannot be empty"));
    }
    Ok(())
}

/// Arguments for the `manage_index` tool.
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Create, sync, check status of, or clear the index for a codebase")]
pub struct ManageIndexArgs {
    /// `create | sync | status | clear`
    #[schemars(description = "Which index operation to perform")]
    pub action: String,
    /// Absolute path to the codebase root.
    #[validate(length(min = 1, message = "path cannot be empty"))]
    #[validate(custom(function = "validate_nonempty_path"))]
    #[schemars(description = "Absolute path to the codebase root directory")]
    pub path: String,
    /// Rebuild even if the fingerprint matches (action=create).
    #[schemars(description = "Force a full rebuild even if already indexed")]
    pub force: Option<bool>,
    /// Splitter choice, surfaced for diagnostics only in this workspace.
    #[schemars(description = "Preferred chunk splitter: ast or langchain")]
    pub splitter: Option<String>,
    /// Extra extensions to include beyond the indexer's defaults.
    #[schemars(description = "Additional file extensions to include during indexing")]
    pub custom_extensions: Option<Vec<String>>,
    /// Extra ignore glob patterns seeded at create time.
    #[schemars(description = "Additional ignore glob patterns for this codebase")]
    pub ignore_patterns: Option<Vec<String>>,
}

/// Arguments for the `search_codebase` tool.
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Search a codebase using a natural language query")]
pub struct SearchCodebaseArgs {
    /// Absolute path to the codebase root.
    #[validate(length(min = 1, message = "path cannot be empty"))]
    #[schemars(description = "Absolute path to the codebase root directory")]
    pub path: String,
    /// The search query; may start with an operator line (`lang:`, `path:`, `must:`, `exclude:`).
    #[validate(length(min = 1, max = 2000, message = "query must be between 1 and 2000 characters"))]
    #[schemars(description = "Natural language query, optionally prefixed by an operator line")]
    pub query: String,
    /// Maximum number of results to return.
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    #[serde(default = "default_limit")]
    #[schemars(description = "Maximum number of results to return")]
    pub limit: usize,
    /// `runtime | docs | mixed`
    #[schemars(description = "Result scope: runtime, docs, or mixed")]
    pub scope: Option<String>,
    /// `raw | grouped`
    #[schemars(description = "Result shape: raw per-chunk results or grouped by symbol")]
    pub result_mode: Option<String>,
    /// File extensions to restrict results to.
    #[schemars(description = "Only include results from files with these extensions")]
    pub extension_filter: Option<Vec<String>>,
    /// Query-time exclude glob patterns.
    #[schemars(description = "Glob patterns to exclude from results")]
    pub exclude_patterns: Option<Vec<String>>,
    /// Whether to apply a reranker to the top results.
    #[schemars(description = "Request reranking of top results, if a reranker is available")]
    pub use_reranker: Option<bool>,
    /// `default | auto_changed_first`
    #[schemars(description = "Ranking mode: default, or auto_changed_first to boost recently changed files")]
    pub ranking_mode: Option<String>,
}

/// Arguments for the `file_outline` tool.
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Retrieve the symbol outline for a file in an indexed codebase")]
pub struct FileOutlineArgs {
    /// Absolute path to the codebase root.
    #[validate(length(min = 1, message = "path cannot be empty"))]
    #[schemars(description = "Absolute path to the codebase root directory")]
    pub path: String,
    /// Relative path of the file within the codebase.
    #[validate(length(min = 1, message = "file cannot be empty"))]
    #[schemars(description = "Relative path of the file to outline")]
    pub file: String,
    /// Cap the number of symbols returned.
    #[schemars(description = "Maximum number of symbols to return")]
    pub limit_symbols: Option<usize>,
    /// `outline | exact`
    #[schemars(description = "outline returns every symbol; exact resolves one by label")]
    pub resolve_mode: Option<String>,
    /// Required when `resolve_mode == exact`.
    #[schemars(description = "Exact symbol label to resolve when resolve_mode is exact")]
    pub symbol_label_exact: Option<String>,
}

/// `symbolRef` argument of `call_graph`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SymbolRefArgs {
    pub file: String,
    pub symbol_id: Option<String>,
    pub symbol_label: Option<String>,
}

/// Arguments for the `call_graph` tool.
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Traverse the call graph from a symbol")]
pub struct CallGraphArgs {
    /// Absolute path to the codebase root.
    #[validate(length(min = 1, message = "path cannot be empty"))]
    #[schemars(description = "Absolute path to the codebase root directory")]
    pub path: String,
    /// The symbol to traverse from.
    #[schemars(description = "Reference to the symbol to traverse the call graph from")]
    pub symbol_ref: SymbolRefArgs,
    /// `callers | callees | both`
    #[schemars(description = "Traversal direction: callers, callees, or both")]
    pub direction: String,
    /// Traversal depth, clamped to `[1, 3]`.
    #[serde(default = "default_depth")]
    #[schemars(description = "Traversal depth, between 1 and 3")]
    pub depth: u8,
    /// Maximum number of nodes to return.
    #[serde(default = "default_call_graph_limit")]
    #[schemars(description = "Maximum number of nodes to return")]
    pub limit: usize,
}

/// Arguments for the `get_indexing_status` tool.
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Check the indexing status of a codebase")]
pub struct GetIndexingStatusArgs {
    /// Absolute path to the codebase root.
    #[validate(length(min = 1, message = "path cannot be empty"))]
    #[schemars(description = "Absolute path to the codebase root directory")]
    pub path: String,
}

/// Arguments for the `list_codebases` tool (no fields; present for schema symmetry).
#[derive(Debug, Default, Deserialize, JsonSchema, Validate)]
#[schemars(description = "List all tracked codebases grouped by status")]
pub struct ListCodebasesArgs {}

/// Arguments for the `read_file` tool.
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[schemars(description = "Read the full contents of a file by absolute path")]
pub struct ReadFileArgs {
    /// Absolute path to the file to read.
    #[validate(length(min = 1, message = "path cannot be empty"))]
    #[schemars(description = "Absolute path to the file to read")]
    pub path: String,
}
