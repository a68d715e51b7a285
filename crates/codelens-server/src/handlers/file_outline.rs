//! `file_outline` tool handler (spec.md §6).

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use validator::Validate;

use codelens_application::use_cases::{FileOutlineOutcome, FileOutlineRequest, FileOutlineUseCase, ResolveMode};

use crate::args::FileOutlineArgs;
use crate::envelope;

pub struct FileOutlineHandler {
    use_case: Arc<FileOutlineUseCase>,
}

impl FileOutlineHandler {
    pub fn new(use_case: Arc<FileOutlineUseCase>) -> Self {
        Self { use_case }
    }

    pub async fn handle(&self, Parameters(args): Parameters<FileOutlineArgs>) -> Result<CallToolResult, McpError> {
        if let Err(e) = args.validate() {
            return Err(McpError::invalid_params(format!("invalid arguments: {e}"), None));
        }

        let resolve_mode = match args.resolve_mode.as_deref() {
            None | Some("outline") => ResolveMode::Outline,
            Some("exact") => ResolveMode::Exact,
            Some(other) => return Err(McpError::invalid_params(format!("unknown resolveMode '{other}'"), None)),
        };

        if resolve_mode == ResolveMode::Exact && args.symbol_label_exact.is_none() {
            return Err(McpError::invalid_params("symbolLabelExact is required when resolveMode is exact", None));
        }

        let request = FileOutlineRequest {
            codebase_root: PathBuf::from(&args.path),
            file: args.file.clone(),
            limit_symbols: args.limit_symbols,
            resolve_mode,
            symbol_label_exact: args.symbol_label_exact.clone(),
        };

        match self.use_case.execute(request).await {
            FileOutlineOutcome::Ok { symbols, has_more } => envelope::ok(json!({
                "status": "ok",
                "symbols": symbols,
                "hasMore": has_more,
            })),
            FileOutlineOutcome::Ambiguous { candidates } => {
                envelope::ok(envelope::ambiguous(serde_json::to_value(candidates).unwrap_or_default()))
            }
            FileOutlineOutcome::NotFound => envelope::ok(envelope::not_found("file_not_found")),
            FileOutlineOutcome::NotIndexed => envelope::ok(envelope::not_indexed(&args.path, None)),
            FileOutlineOutcome::Indexing { percentage } => envelope::ok(envelope::not_ready(&args.path, percentage)),
            FileOutlineOutcome::RequiresReindex { reason } => {
                envelope::ok(envelope::requires_reindex(&args.path, reason))
            }
            FileOutlineOutcome::Unsupported => envelope::ok(envelope::unsupported("no_symbol_sidecar")),
        }
    }
}
