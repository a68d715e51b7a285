//! `list_codebases` tool handler (spec.md §6).

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use std::sync::Arc;

use codelens_application::use_cases::ListCodebasesUseCase;

use crate::args::ListCodebasesArgs;
use crate::envelope;

pub struct ListCodebasesHandler {
    use_case: Arc<ListCodebasesUseCase>,
}

impl ListCodebasesHandler {
    pub fn new(use_case: Arc<ListCodebasesUseCase>) -> Self {
        Self { use_case }
    }

    pub async fn handle(&self, Parameters(_args): Parameters<ListCodebasesArgs>) -> Result<CallToolResult, McpError> {
        let outcome = self.use_case.execute().await;
        envelope::ok(envelope::list_codebases(
            &outcome.not_found,
            &outcome.indexing,
            &outcome.indexed,
            &outcome.sync_completed,
            &outcome.requires_reindex,
            &outcome.indexfailed,
        ))
    }
}
