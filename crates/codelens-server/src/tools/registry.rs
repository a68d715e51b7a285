//! Tool definitions and JSON Schema generation for the MCP `list_tools` response.

use rmcp::ErrorData as McpError;
use rmcp::model::Tool;
use std::borrow::Cow;
use std::sync::Arc;

use crate::args::{
    CallGraphArgs, FileOutlineArgs, GetIndexingStatusArgs, ListCodebasesArgs, ManageIndexArgs,
    ReadFileArgs, SearchCodebaseArgs,
};

pub struct ToolDefinitions;

impl ToolDefinitions {
    pub fn manage_index() -> Result<Tool, McpError> {
        Self::create_tool(
            "manage_index",
            "Create, sync, check the status of, or clear the semantic index for a codebase",
            schemars::schema_for!(ManageIndexArgs),
        )
    }

    pub fn search_codebase() -> Result<Tool, McpError> {
        Self::create_tool(
            "search_codebase",
            "Search an indexed codebase using a natural language query",
            schemars::schema_for!(SearchCodebaseArgs),
        )
    }

    pub fn file_outline() -> Result<Tool, McpError> {
        Self::create_tool(
            "file_outline",
            "Retrieve the symbol outline for a file in an indexed codebase",
            schemars::schema_for!(FileOutlineArgs),
        )
    }

    pub fn call_graph() -> Result<Tool, McpError> {
        Self::create_tool(
            "call_graph",
            "Traverse the call graph outward from a symbol",
            schemars::schema_for!(CallGraphArgs),
        )
    }

    pub fn get_indexing_status() -> Result<Tool, McpError> {
        Self::create_tool(
            "get_indexing_status",
            "Check the indexing status of a codebase",
            schemars::schema_for!(GetIndexingStatusArgs),
        )
    }

    pub fn list_codebases() -> Result<Tool, McpError> {
        Self::create_tool(
            "list_codebases",
            "List every tracked codebase, grouped by status",
            schemars::schema_for!(ListCodebasesArgs),
        )
    }

    pub fn read_file() -> Result<Tool, McpError> {
        Self::create_tool(
            "read_file",
            "Read the full contents of a file by absolute path",
            schemars::schema_for!(ReadFileArgs),
        )
    }

    fn create_tool(name: &'static str, description: &'static str, schema: schemars::Schema) -> Result<Tool, McpError> {
        let schema_value = serde_json::to_value(schema).map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let input_schema = schema_value
            .as_object()
            .ok_or_else(|| McpError::internal_error(format!("schema for {name} is not an object"), None))?
            .clone();

        Ok(Tool {
            name: Cow::Borrowed(name),
            title: None,
            description: Some(Cow::Borrowed(description)),
            input_schema: Arc::new(input_schema),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: Default::default(),
        })
    }
}

/// The complete tool list advertised to MCP clients (spec.md §6 table).
pub fn create_tool_list() -> Result<Vec<Tool>, McpError> {
    Ok(vec![
        ToolDefinitions::manage_index()?,
        ToolDefinitions::search_codebase()?,
        ToolDefinitions::file_outline()?,
        ToolDefinitions::call_graph()?,
        ToolDefinitions::get_indexing_status()?,
        ToolDefinitions::list_codebases()?,
        ToolDefinitions::read_file()?,
    ])
}
