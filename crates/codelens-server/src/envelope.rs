//! Tool handler envelope construction (spec.md §4.5). Every tool's JSON
//! payload is built here as a [`serde_json::Value`] and serialized into the
//! single text content block the MCP protocol expects, matching the
//! teacher's `ResponseFormatter` role (`src/server/formatter.rs`) but
//! producing structured JSON rather than prose, per the envelope contract.

use codelens_domain::value_objects::{CodebaseInfo, ReindexReason};
use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};
use serde_json::{Value, json};

/// Serializes `value` into the single text content block a tool call returns.
pub fn ok(value: Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string(&value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Same as [`ok`] but marks the result `isError=true` (spec.md §4.5).
pub fn error(value: Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string(&value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::error(vec![Content::text(text)]))
}

fn reindex_hint(path: &str) -> Value {
    json!({"tool": "manage_index", "args": {"action": "create", "path": path, "force": true}})
}

fn create_hint(path: &str) -> Value {
    json!({"tool": "manage_index", "args": {"action": "create", "path": path}})
}

/// `{status, reason:"not_indexed", hints.create, hints.staleLocal?}`
pub fn not_indexed(path: &str, stale_local_reason: Option<&str>) -> Value {
    let mut hints = json!({"create": create_hint(path)});
    if let Some(reason) = stale_local_reason {
        hints["staleLocal"] = json!({"reason": reason, "recommended": create_hint(path)});
    }
    json!({"status": "not_indexed", "reason": "not_indexed", "hints": hints})
}

/// `{status, reason:"indexing", hints.status, hints.retryAfterMs}` (spec.md §4.5 `not_ready`).
pub fn not_ready(path: &str, percentage: u8) -> Value {
    json!({
        "status": "not_ready",
        "reason": "indexing",
        "indexingPercentage": percentage,
        "hints": {
            "status": {"tool": "get_indexing_status", "args": {"path": path}},
            "retryAfterMs": 2000,
        },
    })
}

/// `{status, reason:"requires_reindex", compatibility.reindexReason, hints.reindex}`.
pub fn requires_reindex(path: &str, reason: ReindexReason) -> Value {
    json!({
        "status": "requires_reindex",
        "reason": "requires_reindex",
        "compatibility": {"reindexReason": reason},
        "hints": {"reindex": reindex_hint(path)},
    })
}

/// `{status:"unsupported", ...}` — no sidecar wired for `file_outline`/`call_graph`.
pub fn unsupported(reason: &str) -> Value {
    json!({"status": "unsupported", "reason": reason})
}

/// `{status:"not_found", ...}`
pub fn not_found(reason: &str) -> Value {
    json!({"status": "not_found", "reason": reason})
}

/// `{status:"ambiguous", candidates[...]}`
pub fn ambiguous(candidates: Value) -> Value {
    json!({"status": "ambiguous", "reason": "ambiguous_symbol", "candidates": candidates})
}

/// `manage_index` success envelope for a given action outcome.
pub fn manage_index_ok(action: &str, path: &str, status: &str, reason: Option<&str>, human_text: &str) -> Value {
    json!({"action": action, "path": path, "status": status, "reason": reason, "humanText": human_text})
}

/// `list_codebases` summary grouped by status kind.
pub fn list_codebases(
    not_found: &[CodebaseInfo],
    indexing: &[CodebaseInfo],
    indexed: &[CodebaseInfo],
    sync_completed: &[CodebaseInfo],
    requires_reindex: &[CodebaseInfo],
    index_failed: &[CodebaseInfo],
) -> Value {
    json!({
        "status": "ok",
        "codebases": {
            "not_found": not_found,
            "indexing": indexing,
            "indexed": indexed,
            "sync_completed": sync_completed,
            "requires_reindex": requires_reindex,
            "index_failed": index_failed,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_indexed_without_stale_reason_omits_stale_local_hint() {
        let value = not_indexed("/repo", None);
        assert_eq!(value["status"], "not_indexed");
        assert!(value["hints"].get("staleLocal").is_none());
    }

    #[test]
    fn not_indexed_with_stale_reason_includes_stale_local_hint() {
        let value = not_indexed("/repo", Some("ignore_rules_changed"));
        assert_eq!(value["hints"]["staleLocal"]["reason"], "ignore_rules_changed");
    }

    #[test]
    fn not_ready_reports_percentage_and_retry_hint() {
        let value = not_ready("/repo", 42);
        assert_eq!(value["indexingPercentage"], 42);
        assert_eq!(value["hints"]["retryAfterMs"], 2000);
    }

    #[test]
    fn requires_reindex_carries_the_reason() {
        let value = requires_reindex("/repo", ReindexReason::FingerprintMismatch);
        assert_eq!(value["status"], "requires_reindex");
        assert_eq!(value["compatibility"]["reindexReason"], "fingerprint_mismatch");
        assert_eq!(value["hints"]["reindex"]["args"]["force"], true);
    }

    #[test]
    fn list_codebases_groups_by_kind() {
        let value = list_codebases(&[], &[], &[], &[], &[], &[]);
        assert!(value["codebases"]["indexed"].as_array().unwrap().is_empty());
    }
}
