//! MCP server handler backed by a live capability set.

use rmcp::model as m;
use rmcp::service::{Peer, RequestContext};
use rmcp::{RoleServer, ServerHandler};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use toolsets_core::{
    LiveCapabilities, ResourceTemplateDescriptor, ServerTool, SharedToolsetGroup, ToolContext,
    ToolError, fallback_text_from_json,
};

/// MCP server handler backed by [`LiveCapabilities`].
///
/// The handler reads the capability set on every request, so tools published
/// mid-session (for example by `enable_toolset`) show up on the next
/// `tools/list`. When a tool call grows the set, the client is sent
/// `notifications/tools/list_changed`.
///
/// # Example
///
/// ```ignore
/// use toolsets_mcp::{ServiceExt, ToolsetServer, stdio};
///
/// let server = ToolsetServer::new(live)
///     .with_info("toolsets-server", "0.1.0")
///     .with_group(group);
/// let service = server.serve(stdio()).await?;
/// service.waiting().await?;
/// ```
pub struct ToolsetServer {
    live: Arc<LiveCapabilities>,
    group: Option<SharedToolsetGroup>,
    announced: AtomicU64,
    name: String,
    version: String,
}

impl ToolsetServer {
    /// Create a new server over a capability set.
    ///
    /// Everything live at this point is considered already announced.
    pub fn new(live: Arc<LiveCapabilities>) -> Self {
        let announced = AtomicU64::new(live.revision());
        Self {
            live,
            group: None,
            announced,
            name: "toolsets".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the server name and version.
    pub fn with_info(mut self, name: &str, version: &str) -> Self {
        self.name = name.to_string();
        self.version = version.to_string();
        self
    }

    /// Keep `group` alive while the server runs.
    ///
    /// The discovery tools in the live set only hold a weak handle to their
    /// group, so a server built from `init_toolsets` should own it.
    pub fn with_group(mut self, group: SharedToolsetGroup) -> Self {
        self.group = Some(group);
        self
    }

    /// The toolset group this server owns, if any.
    pub fn group(&self) -> Option<&SharedToolsetGroup> {
        self.group.as_ref()
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The capability set being served.
    pub fn live(&self) -> &Arc<LiveCapabilities> {
        &self.live
    }

    /// True if capabilities were added since the last call that returned true.
    pub fn take_list_changed(&self) -> bool {
        let current = self.live.revision();
        self.announced.fetch_max(current, Ordering::AcqRel) < current
    }

    /// Tools as MCP descriptors, in registration order.
    pub fn mcp_tools(&self) -> Vec<m::Tool> {
        self.live.tools().iter().map(to_mcp_tool).collect()
    }

    /// Call a tool and render the outcome as an MCP result.
    ///
    /// Handler failures become error-flagged results rather than protocol errors.
    pub async fn call(&self, name: &str, args: serde_json::Value) -> m::CallToolResult {
        let ctx = ToolContext::new();
        match self.live.call_tool(name, args, &ctx).await {
            Ok(res) => {
                let text = res
                    .text
                    .unwrap_or_else(|| fallback_text_from_json(&res.data));
                m::CallToolResult {
                    content: vec![m::Content::text(text)],
                    structured_content: None,
                    is_error: Some(false),
                    meta: None,
                }
            }
            Err(e) => {
                tracing::debug!(tool = %name, error = %e, "tool call failed");
                m::CallToolResult::error(vec![m::Content::text(e.to_string())])
            }
        }
    }

    /// Resource templates as MCP descriptors.
    pub fn mcp_resource_templates(&self) -> Result<Vec<m::ResourceTemplate>, m::ErrorData> {
        self.live
            .resource_templates()
            .iter()
            .map(|t| to_mcp_resource_template(t.descriptor()))
            .collect()
    }

    /// Read a resource through the matching live template.
    pub async fn read(&self, uri: &str) -> Result<m::ReadResourceResult, m::ErrorData> {
        let ctx = ToolContext::new();
        let contents = self
            .live
            .read_resource(uri, &ctx)
            .await
            .map_err(|e| match e {
                ToolError::Internal(_) => m::ErrorData::internal_error(e.to_string(), None),
                _ => m::ErrorData::invalid_params(e.to_string(), None),
            })?;
        serde_json::from_value(serde_json::json!({ "contents": contents }))
            .map_err(|e| m::ErrorData::internal_error(e.to_string(), None))
    }

    async fn announce_changes(&self, peer: &Peer<RoleServer>) {
        if self.take_list_changed() {
            tracing::debug!(revision = self.live.revision(), "announcing tool list change");
            if let Err(e) = peer.notify_tool_list_changed().await {
                tracing::warn!(error = %e, "failed to send tools/list_changed");
            }
        }
    }
}

fn to_mcp_tool(tool: &ServerTool) -> m::Tool {
    let d = tool.descriptor();
    let title = d.title().unwrap_or(d.name()).to_string();
    m::Tool {
        name: d.name().to_string().into(),
        title: Some(title.clone()),
        description: Some(d.description().to_string().into()),
        input_schema: Arc::new(d.input_schema().clone()),
        annotations: d
            .read_only_hint()
            .map(|read_only| m::ToolAnnotations::with_title(title).read_only(read_only)),
        output_schema: None,
        icons: None,
        meta: None,
    }
}

fn to_mcp_resource_template(
    d: &ResourceTemplateDescriptor,
) -> Result<m::ResourceTemplate, m::ErrorData> {
    serde_json::to_value(d)
        .and_then(serde_json::from_value)
        .map_err(|e| m::ErrorData::internal_error(e.to_string(), None))
}

// The trait signature uses `impl Future` return types
#[expect(clippy::manual_async_fn)]
impl ServerHandler for ToolsetServer {
    fn initialize(
        &self,
        _params: m::InitializeRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::InitializeResult, m::ErrorData>> + Send + '_
    {
        async move {
            self.announced
                .fetch_max(self.live.revision(), Ordering::AcqRel);
            Ok(m::InitializeResult {
                server_info: m::Implementation {
                    name: self.name.clone(),
                    title: self.name.clone().into(),
                    version: self.version.clone(),
                    website_url: None,
                    icons: None,
                },
                capabilities: m::ServerCapabilities::builder()
                    .enable_resources()
                    .enable_tools()
                    .enable_tool_list_changed()
                    .build(),
                ..Default::default()
            })
        }
    }

    fn list_tools(
        &self,
        _req: Option<m::PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListToolsResult, m::ErrorData>> + Send + '_
    {
        async move {
            Ok(m::ListToolsResult {
                tools: self.mcp_tools(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        req: m::CallToolRequestParam,
        ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::CallToolResult, m::ErrorData>> + Send + '_
    {
        async move {
            let args = serde_json::Value::Object(req.arguments.unwrap_or_default());
            let result = self.call(&req.name, args).await;
            self.announce_changes(&ctx.peer).await;
            Ok(result)
        }
    }

    fn list_resources(
        &self,
        _req: Option<m::PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListResourcesResult, m::ErrorData>> + Send + '_
    {
        async {
            Ok(m::ListResourcesResult {
                resources: vec![],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn list_resource_templates(
        &self,
        _req: Option<m::PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListResourceTemplatesResult, m::ErrorData>>
    + Send
    + '_ {
        async move {
            Ok(m::ListResourceTemplatesResult {
                resource_templates: self.mcp_resource_templates()?,
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        req: m::ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ReadResourceResult, m::ErrorData>> + Send + '_
    {
        async move { self.read(&req.uri).await }
    }
}
