//! `read_file` tool handler (spec.md §6).

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use validator::Validate;

use codelens_application::use_cases::ReadFileUseCase;

use crate::args::ReadFileArgs;
use crate::envelope;

pub struct ReadFileHandler {
    use_case: Arc<ReadFileUseCase>,
}

impl ReadFileHandler {
    pub fn new(use_case: Arc<ReadFileUseCase>) -> Self {
        Self { use_case }
    }

    pub async fn handle(&self, Parameters(args): Parameters<ReadFileArgs>) -> Result<CallToolResult, McpError> {
        if let Err(e) = args.validate() {
            return Err(McpError::invalid_params(format!("invalid arguments: {e}"), None));
        }

        match self.use_case.execute(Path::new(&args.path)).await {
            Ok(contents) => envelope::ok(json!({"status": "ok", "path": args.path, "contents": contents})),
            Err(e) => envelope::error(json!({"status": "error", "path": args.path, "message": e.to_string()})),
        }
    }
}
