//! `manage_index` tool handler (`action ∈ {create, sync, status, clear}`, spec.md §6).

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use validator::Validate;

use codelens_application::freshness::FreshnessMode;
use codelens_application::use_cases::{ManageIndexAction, ManageIndexOutcome, ManageIndexRequest, ManageIndexUseCase};
use codelens_domain::value_objects::CodebaseStatus;

use crate::args::ManageIndexArgs;
use crate::envelope;

pub struct ManageIndexHandler {
    use_case: Arc<ManageIndexUseCase>,
}

impl ManageIndexHandler {
    pub fn new(use_case: Arc<ManageIndexUseCase>) -> Self {
        Self { use_case }
    }

    pub async fn handle(&self, Parameters(args): Parameters<ManageIndexArgs>) -> Result<CallToolResult, McpError> {
        if let Err(e) = args.validate() {
            return Err(McpError::invalid_params(format!("invalid arguments: {e}"), None));
        }

        let action = parse_action(&args.action).map_err(|e| McpError::invalid_params(e, None))?;

        let request = ManageIndexRequest {
            action,
            path: PathBuf::from(&args.path),
            force: args.force.unwrap_or(false),
            ignore_patterns: args.ignore_patterns.clone().unwrap_or_default(),
        };

        match self.use_case.execute(request).await {
            Ok(outcome) => render_outcome(&args.path, &args.action, outcome),
            Err(e) => envelope::error(json!({
                "status": "error",
                "action": args.action,
                "path": args.path,
                "message": e.to_string(),
            })),
        }
    }
}

fn parse_action(raw: &str) -> Result<ManageIndexAction, String> {
    match raw {
        "create" => Ok(ManageIndexAction::Create),
        "sync" => Ok(ManageIndexAction::Sync),
        "status" => Ok(ManageIndexAction::Status),
        "clear" => Ok(ManageIndexAction::Clear),
        other => Err(format!("unknown action '{other}'")),
    }
}

fn render_outcome(path: &str, action: &str, outcome: ManageIndexOutcome) -> Result<CallToolResult, McpError> {
    match outcome {
        ManageIndexOutcome::Created => {
            envelope::ok(envelope::manage_index_ok(action, path, "indexing", None, "Indexing started in the background."))
        }
        ManageIndexOutcome::AlreadyIndexing { percentage } => envelope::ok(envelope::not_ready(path, percentage)),
        ManageIndexOutcome::Cleared => {
            envelope::ok(envelope::manage_index_ok(action, path, "not_found", None, "Index cleared."))
        }
        ManageIndexOutcome::NotFound => envelope::ok(envelope::not_found("not_found")),
        ManageIndexOutcome::Status(status) => envelope::ok(render_status(path, status)),
        ManageIndexOutcome::Synced(decision) => envelope::ok(json!({
            "action": action,
            "path": path,
            "status": "ok",
            "mode": freshness_mode_label(decision.mode),
            "stats": decision.stats,
            "changedFiles": decision.changed_files,
            "ignoreRulesVersion": decision.ignore_rules_version,
            "deletedFiles": decision.deleted_files,
            "newlyIgnoredFiles": decision.newly_ignored_files,
            "addedFiles": decision.added_files,
            "coalescedEdits": decision.coalesced_edits,
            "durationMs": decision.duration_ms,
            "fallbackSyncExecuted": decision.fallback_sync_executed,
            "errorMessage": decision.error_message,
        })),
    }
}

fn render_status(path: &str, status: Option<CodebaseStatus>) -> serde_json::Value {
    match status {
        None => envelope::not_indexed(path, None),
        Some(status) => json!({
            "status": "ok",
            "path": path,
            "kind": status.kind(),
            "detail": status,
        }),
    }
}

fn freshness_mode_label(mode: FreshnessMode) -> &'static str {
    match mode {
        FreshnessMode::Synced => "synced",
        FreshnessMode::SkippedRecent => "skipped_recent",
        FreshnessMode::Coalesced => "coalesced",
        FreshnessMode::SkippedIndexing => "skipped_indexing",
        FreshnessMode::SkippedRequiresReindex => "skipped_requires_reindex",
        FreshnessMode::SkippedMissingPath => "skipped_missing_path",
        FreshnessMode::ReconciledIgnoreChange => "reconciled_ignore_change",
        FreshnessMode::IgnoreReloadFailed => "ignore_reload_failed",
    }
}
