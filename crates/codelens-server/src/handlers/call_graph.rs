//! `call_graph` tool handler (spec.md §6, §9).

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use validator::Validate;

use codelens_application::use_cases::{CallGraphOutcome, CallGraphRequest, CallGraphUseCase};
use codelens_domain::value_objects::{CallGraphDirection, SymbolRef};

use crate::args::CallGraphArgs;
use crate::envelope;

pub struct CallGraphHandler {
    use_case: Arc<CallGraphUseCase>,
}

impl CallGraphHandler {
    pub fn new(use_case: Arc<CallGraphUseCase>) -> Self {
        Self { use_case }
    }

    pub async fn handle(&self, Parameters(args): Parameters<CallGraphArgs>) -> Result<CallToolResult, McpError> {
        if let Err(e) = args.validate() {
            return Err(McpError::invalid_params(format!("invalid arguments: {e}"), None));
        }

        let direction = parse_direction(&args.direction).map_err(|e| McpError::invalid_params(e, None))?;

        let request = CallGraphRequest {
            codebase_root: PathBuf::from(&args.path),
            symbol_ref: SymbolRef {
                file: args.symbol_ref.file.clone(),
                symbol_id: args.symbol_ref.symbol_id.clone(),
                symbol_label: args.symbol_ref.symbol_label.clone(),
            },
            direction,
            depth: args.depth,
            limit: args.limit,
        };

        match self.use_case.execute(request).await {
            CallGraphOutcome::Ok(result) => envelope::ok(json!({
                "status": "ok",
                "nodes": result.nodes,
                "edges": result.edges,
            })),
            CallGraphOutcome::NotFound => envelope::ok(envelope::not_found("symbol_not_found")),
            CallGraphOutcome::NotIndexed => envelope::ok(envelope::not_indexed(&args.path, None)),
            CallGraphOutcome::Indexing { percentage } => envelope::ok(envelope::not_ready(&args.path, percentage)),
            CallGraphOutcome::RequiresReindex { reason } => envelope::ok(envelope::requires_reindex(&args.path, reason)),
            CallGraphOutcome::Unsupported => envelope::ok(envelope::unsupported("no_symbol_sidecar")),
        }
    }
}

fn parse_direction(raw: &str) -> Result<CallGraphDirection, String> {
    match raw {
        "callers" => Ok(CallGraphDirection::Callers),
        "callees" => Ok(CallGraphDirection::Callees),
        "both" => Ok(CallGraphDirection::Both),
        other => Err(format!("unknown direction '{other}'")),
    }
}
