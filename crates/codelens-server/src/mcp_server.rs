//! Core MCP protocol server: advertises and dispatches the seven tools
//! (spec.md §6) over whichever `rmcp` transport the binary crate wires up.

use std::sync::Arc;

use rmcp::ErrorData as McpError;
use rmcp::ServerHandler;
use rmcp::model::{
    CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
    ServerCapabilities, ServerInfo,
};

use codelens_application::use_cases::{
    CallGraphUseCase, FileOutlineUseCase, GetIndexingStatusUseCase, ListCodebasesUseCase,
    ManageIndexUseCase, ReadFileUseCase, SearchCodebaseUseCase,
};

use crate::handlers::{
    CallGraphHandler, FileOutlineHandler, GetIndexingStatusHandler, ListCodebasesHandler,
    ManageIndexHandler, ReadFileHandler, SearchCodebaseHandler,
};
use crate::tools::{ToolHandlers, create_tool_list, route_tool_call};

/// MCP server for the coordinator: wraps the seven `codelens-application`
/// use cases in their matching handlers and exposes them over `rmcp`.
#[derive(Clone)]
pub struct CodelensServer {
    manage_index_handler: Arc<ManageIndexHandler>,
    search_codebase_handler: Arc<SearchCodebaseHandler>,
    file_outline_handler: Arc<FileOutlineHandler>,
    call_graph_handler: Arc<CallGraphHandler>,
    get_indexing_status_handler: Arc<GetIndexingStatusHandler>,
    list_codebases_handler: Arc<ListCodebasesHandler>,
    read_file_handler: Arc<ReadFileHandler>,
}

impl CodelensServer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        manage_index: Arc<ManageIndexUseCase>,
        search_codebase: Arc<SearchCodebaseUseCase>,
        file_outline: Arc<FileOutlineUseCase>,
        call_graph: Arc<CallGraphUseCase>,
        get_indexing_status: Arc<GetIndexingStatusUseCase>,
        list_codebases: Arc<ListCodebasesUseCase>,
        read_file: Arc<ReadFileUseCase>,
    ) -> Self {
        Self {
            manage_index_handler: Arc::new(ManageIndexHandler::new(manage_index)),
            search_codebase_handler: Arc::new(SearchCodebaseHandler::new(search_codebase)),
            file_outline_handler: Arc::new(FileOutlineHandler::new(file_outline)),
            call_graph_handler: Arc::new(CallGraphHandler::new(call_graph)),
            get_indexing_status_handler: Arc::new(GetIndexingStatusHandler::new(get_indexing_status)),
            list_codebases_handler: Arc::new(ListCodebasesHandler::new(list_codebases)),
            read_file_handler: Arc::new(ReadFileHandler::new(read_file)),
        }
    }
}

impl ServerHandler for CodelensServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "codelens".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Codelens - semantic code search coordinator for agents\n\n\
                 Tools:\n\
                 - manage_index: create, sync, check status of, or clear a codebase's index\n\
                 - search_codebase: semantic search over an indexed codebase\n\
                 - file_outline: list the symbols in a file\n\
                 - call_graph: traverse callers/callees from a symbol\n\
                 - get_indexing_status: inspect indexing progress\n\
                 - list_codebases: list every tracked codebase by status\n\
                 - read_file: read a file's full contents by absolute path\n"
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _pagination: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = create_tool_list()?;
        Ok(ListToolsResult { tools, meta: Default::default(), next_cursor: None })
    }

    async fn call_tool(
        &self,
        request: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let handlers = ToolHandlers {
            manage_index: Arc::clone(&self.manage_index_handler),
            search_codebase: Arc::clone(&self.search_codebase_handler),
            file_outline: Arc::clone(&self.file_outline_handler),
            call_graph: Arc::clone(&self.call_graph_handler),
            get_indexing_status: Arc::clone(&self.get_indexing_status_handler),
            list_codebases: Arc::clone(&self.list_codebases_handler),
            read_file: Arc::clone(&self.read_file_handler),
        };
        route_tool_call(request, &handlers).await
    }
}
