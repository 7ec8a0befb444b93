//! Integration tests for the MCP server.
//!
//! These drive [`ToolsetServer`] through its request helpers without a
//! transport, using the real discovery toolset.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use toolsets_core::{
    BoxFuture, HostServer, LiveCapabilities, ResourceContents, ResourceTemplate,
    ResourceTemplateDescriptor, ServerTool, SharedToolsetGroup, TextFormat, Tool, ToolContext,
    ToolError, Toolset, ToolsetGroup, dynamic_toolset,
};
use toolsets_mcp::ToolsetServer;

// =============================================================================
// Test Tool Definitions
// =============================================================================

#[derive(Clone)]
struct SearchRepositories;

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchInput {
    /// Search query
    query: String,
}

#[derive(Debug, Serialize)]
struct SearchOutput {
    items: Vec<String>,
    total: usize,
}

impl TextFormat for SearchOutput {}

impl Tool for SearchRepositories {
    type Input = SearchInput;
    type Output = SearchOutput;
    const NAME: &'static str = "search_repositories";
    const DESCRIPTION: &'static str = "Search repositories";

    fn call(
        &self,
        input: Self::Input,
        _ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<Self::Output, ToolError>> {
        Box::pin(async move {
            Ok(SearchOutput {
                items: vec![format!("octo/{}", input.query)],
                total: 1,
            })
        })
    }
}

fn readme_template() -> ResourceTemplate {
    ResourceTemplate::new(
        ResourceTemplateDescriptor::new("repo://{owner}/{repo}/readme", "Repository README")
            .with_mime_type("text/markdown"),
        |uri: &str,
         vars: &HashMap<String, String>,
         _ctx: &ToolContext|
         -> BoxFuture<'static, Result<Vec<ResourceContents>, ToolError>> {
            let contents = ResourceContents::Text {
                uri: uri.to_string(),
                mime_type: Some("text/markdown".into()),
                text: format!("# {}/{}", vars["owner"], vars["repo"]),
            };
            Box::pin(async move { Ok(vec![contents]) })
        },
    )
}

/// A dynamic-mode server: only the discovery tools are live at start.
fn dynamic_server() -> (SharedToolsetGroup, ToolsetServer) {
    let mut group = ToolsetGroup::new(false);
    group
        .add_toolset(
            Toolset::builder("repos", "Repositories")
                .read_tool(ServerTool::from_tool::<SearchRepositories, ()>(
                    SearchRepositories,
                ))
                .resource_template(readme_template())
                .finish(),
        )
        .unwrap();
    let group = SharedToolsetGroup::new(group);

    let live = Arc::new(LiveCapabilities::new());
    let host: Arc<dyn HostServer> = Arc::clone(&live) as Arc<dyn HostServer>;
    let dynamic = dynamic_toolset(&group, &host);
    group.write(|g| g.add_toolset(dynamic)).unwrap();
    group.write(|g| g.enable_toolset("dynamic")).unwrap();
    group.read(|g| g.register_with(live.as_ref()));

    (group, ToolsetServer::new(live))
}

fn text_of(result: &rmcp::model::CallToolResult) -> String {
    let v = serde_json::to_value(&result.content[0]).unwrap();
    v["text"].as_str().unwrap_or_default().to_string()
}

fn tool_names(server: &ToolsetServer) -> Vec<String> {
    server
        .mcp_tools()
        .into_iter()
        .map(|t| t.name.to_string())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn server_keeps_discovery_tools_working_without_caller_handle() {
    let (group, server) = dynamic_server();
    let server = server.with_group(group.clone());
    drop(group);

    let res = server
        .call("list_available_toolsets", serde_json::json!({}))
        .await;
    assert_eq!(res.is_error, Some(false));
    assert_eq!(text_of(&res), r#"{"dynamic":true,"repos":false}"#);

    let res = server
        .call("enable_toolset", serde_json::json!({"toolset": "repos"}))
        .await;
    assert_eq!(text_of(&res), "Toolset repos enabled");
    assert!(server.group().is_some());
}

#[tokio::test]
async fn enabling_a_toolset_grows_tools_list() {
    let (_group, server) = dynamic_server();
    assert_eq!(
        tool_names(&server),
        vec![
            "list_available_toolsets",
            "get_toolset_tools",
            "enable_toolset"
        ]
    );
    assert!(!server.take_list_changed());

    let res = server
        .call("enable_toolset", serde_json::json!({"toolset": "repos"}))
        .await;
    assert_eq!(res.is_error, Some(false));
    assert_eq!(text_of(&res), "Toolset repos enabled");

    assert!(tool_names(&server).contains(&"search_repositories".to_string()));
    assert!(server.take_list_changed());
}

#[tokio::test]
async fn newly_enabled_tool_is_callable() {
    let (_group, server) = dynamic_server();
    server
        .call("enable_toolset", serde_json::json!({"toolset": "repos"}))
        .await;

    let res = server
        .call("search_repositories", serde_json::json!({"query": "hello"}))
        .await;
    assert_eq!(res.is_error, Some(false));
    assert_eq!(text_of(&res), r#"{"items":["octo/hello"],"total":1}"#);
}

#[tokio::test]
async fn failures_are_error_results() {
    let (_group, server) = dynamic_server();

    let res = server
        .call("enable_toolset", serde_json::json!({"toolset": "issues"}))
        .await;
    assert_eq!(res.is_error, Some(true));
    assert_eq!(text_of(&res), "Toolset issues not found");

    let res = server
        .call("search_repositories", serde_json::json!({"query": "x"}))
        .await;
    assert_eq!(res.is_error, Some(true));
    assert_eq!(text_of(&res), "unknown tool: search_repositories");
}

#[tokio::test]
async fn listing_reflects_dynamic_toolset() {
    let (_group, server) = dynamic_server();
    let res = server
        .call("list_available_toolsets", serde_json::json!({}))
        .await;
    assert_eq!(text_of(&res), r#"{"dynamic":true,"repos":false}"#);
}

#[tokio::test]
async fn runtime_enable_publishes_tools_only() {
    let (_group, server) = dynamic_server();
    assert!(server.mcp_resource_templates().unwrap().is_empty());
    assert!(server.read("repo://octo/hello/readme").await.is_err());

    server
        .call("enable_toolset", serde_json::json!({"toolset": "repos"}))
        .await;

    // templates arrive with startup registration
    assert!(server.mcp_resource_templates().unwrap().is_empty());
    assert!(server.read("repo://octo/hello/readme").await.is_err());
}

#[tokio::test]
async fn startup_registration_serves_templates() {
    let mut group = ToolsetGroup::new(false);
    group
        .add_toolset(
            Toolset::builder("repos", "Repositories")
                .resource_template(readme_template())
                .finish(),
        )
        .unwrap();
    group.enable_toolset("repos").unwrap();
    let live = Arc::new(LiveCapabilities::new());
    group.register_with(live.as_ref());
    let server = ToolsetServer::new(live);

    let templates = server.mcp_resource_templates().unwrap();
    assert_eq!(templates.len(), 1);

    let read = server.read("repo://octo/hello/readme").await.unwrap();
    let v = serde_json::to_value(&read).unwrap();
    assert_eq!(v["contents"][0]["text"], "# octo/hello");
    assert_eq!(v["contents"][0]["mimeType"], "text/markdown");
}
