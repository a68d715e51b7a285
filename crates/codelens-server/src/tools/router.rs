//! Dispatches an incoming MCP tool call to its handler.

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolRequestParam, CallToolResult};
use std::sync::Arc;

use crate::args::{
    CallGraphArgs, FileOutlineArgs, GetIndexingStatusArgs, ListCodebasesArgs, ManageIndexArgs,
    ReadFileArgs, SearchCodebaseArgs,
};
use crate::handlers::{
    CallGraphHandler, FileOutlineHandler, GetIndexingStatusHandler, ListCodebasesHandler,
    ManageIndexHandler, ReadFileHandler, SearchCodebaseHandler,
};

/// One handler reference per advertised tool.
pub struct ToolHandlers {
    pub manage_index: Arc<ManageIndexHandler>,
    pub search_codebase: Arc<SearchCodebaseHandler>,
    pub file_outline: Arc<FileOutlineHandler>,
    pub call_graph: Arc<CallGraphHandler>,
    pub get_indexing_status: Arc<GetIndexingStatusHandler>,
    pub list_codebases: Arc<ListCodebasesHandler>,
    pub read_file: Arc<ReadFileHandler>,
}

pub async fn route_tool_call(request: CallToolRequestParam, handlers: &ToolHandlers) -> Result<CallToolResult, McpError> {
    match request.name.as_ref() {
        "manage_index" => {
            let args = parse_args::<ManageIndexArgs>(&request)?;
            handlers.manage_index.handle(Parameters(args)).await
        }
        "search_codebase" => {
            let args = parse_args::<SearchCodebaseArgs>(&request)?;
            handlers.search_codebase.handle(Parameters(args)).await
        }
        "file_outline" => {
            let args = parse_args::<FileOutlineArgs>(&request)?;
            handlers.file_outline.handle(Parameters(args)).await
        }
        "call_graph" => {
            let args = parse_args::<CallGraphArgs>(&request)?;
            handlers.call_graph.handle(Parameters(args)).await
        }
        "get_indexing_status" => {
            let args = parse_args::<GetIndexingStatusArgs>(&request)?;
            handlers.get_indexing_status.handle(Parameters(args)).await
        }
        "list_codebases" => {
            let args = parse_args::<ListCodebasesArgs>(&request)?;
            handlers.list_codebases.handle(Parameters(args)).await
        }
        "read_file" => {
            let args = parse_args::<ReadFileArgs>(&request)?;
            handlers.read_file.handle(Parameters(args)).await
        }
        other => Err(McpError::invalid_params(format!("unknown tool: {other}"), None)),
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(request: &CallToolRequestParam) -> Result<T, McpError> {
    let args_value = serde_json::Value::Object(request.arguments.clone().unwrap_or_default());
    serde_json::from_value(args_value).map_err(|e| McpError::invalid_params(format!("invalid arguments: {e}"), None))
}
