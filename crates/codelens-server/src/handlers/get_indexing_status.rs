//! `get_indexing_status` tool handler (spec.md §4.1, §6).

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use validator::Validate;

use codelens_application::use_cases::{GetIndexingStatusOutcome, GetIndexingStatusUseCase};

use crate::args::GetIndexingStatusArgs;
use crate::envelope;

pub struct GetIndexingStatusHandler {
    use_case: Arc<GetIndexingStatusUseCase>,
}

impl GetIndexingStatusHandler {
    pub fn new(use_case: Arc<GetIndexingStatusUseCase>) -> Self {
        Self { use_case }
    }

    pub async fn handle(&self, Parameters(args): Parameters<GetIndexingStatusArgs>) -> Result<CallToolResult, McpError> {
        if let Err(e) = args.validate() {
            return Err(McpError::invalid_params(format!("invalid arguments: {e}"), None));
        }

        // No process-restart liveness signal is wired into this workspace, so a
        // stale `indexing` entry is only reconciled lazily, never proactively.
        let looks_stale = false;

        match self.use_case.execute(Path::new(&args.path), looks_stale).await {
            GetIndexingStatusOutcome::NotFound => envelope::ok(envelope::not_found("not_found")),
            GetIndexingStatusOutcome::Status(status) => envelope::ok(json!({
                "status": "ok",
                "path": args.path,
                "kind": status.kind(),
                "detail": status,
            })),
        }
    }
}
