//! Tool registry tests, grounded on the teacher's `tests/tools/registry_test.rs`.

use codelens_server::tools::create_tool_list;

#[test]
fn tool_list_advertises_all_seven_tools() {
    let tools = create_tool_list().expect("should create tool list");
    assert_eq!(tools.len(), 7);

    let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
    for expected in [
        "manage_index",
        "search_codebase",
        "file_outline",
        "call_graph",
        "get_indexing_status",
        "list_codebases",
        "read_file",
    ] {
        assert!(names.contains(&expected), "missing tool: {expected}");
    }
}

#[test]
fn every_tool_has_a_description_and_object_schema() {
    let tools = create_tool_list().expect("should create tool list");
    for tool in tools {
        assert!(tool.description.is_some(), "{} should have a description", tool.name);
        assert!(tool.input_schema.contains_key("properties") || tool.input_schema.contains_key("type"));
    }
}
