//! The registration seam between toolsets and a live server.

use crate::capability::{ResourceContents, ResourceTemplate, ServerTool};
use crate::context::ToolContext;
use crate::error::ToolError;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A server that capabilities can be pushed into, at startup or mid-session.
pub trait HostServer: Send + Sync {
    /// Register one tool.
    fn add_tool(&self, tool: ServerTool);

    /// Register many tools at once.
    fn add_tools(&self, tools: Vec<ServerTool>) {
        for tool in tools {
            self.add_tool(tool);
        }
    }

    /// Register one resource template.
    fn add_resource_template(&self, template: ResourceTemplate);
}

#[derive(Default)]
struct Inner {
    tools: Vec<ServerTool>,
    tool_index: HashMap<String, usize>,
    templates: Vec<ResourceTemplate>,
    template_index: HashMap<String, usize>,
}

/// In-memory capability set behind an MCP server.
///
/// Tools are keyed by name and resource templates by URI template.
/// Registering an identifier twice replaces the earlier entry in place, so
/// listing order is first-registration order and names never repeat.
///
/// The revision counter advances whenever a new identifier appears. Servers
/// compare it against the last value they announced to decide whether a
/// `list_changed` notification is due.
#[derive(Default)]
pub struct LiveCapabilities {
    inner: RwLock<Inner>,
    revision: AtomicU64,
}

impl std::fmt::Debug for LiveCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveCapabilities")
            .field("tools", &self.tool_names())
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

impl LiveCapabilities {
    /// Create an empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tool. Returns true if the name was new.
    pub fn insert_tool(&self, tool: ServerTool) -> bool {
        let name = tool.name().to_string();
        let mut inner = self.inner.write();
        if let Some(&idx) = inner.tool_index.get(&name) {
            tracing::debug!(tool = %name, "replacing registered tool");
            inner.tools[idx] = tool;
            return false;
        }
        let idx = inner.tools.len();
        inner.tools.push(tool);
        inner.tool_index.insert(name.clone(), idx);
        self.revision.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(tool = %name, "registered tool");
        true
    }

    /// Insert or replace a resource template. Returns true if the template was new.
    pub fn insert_resource_template(&self, template: ResourceTemplate) -> bool {
        let key = template.uri_template().to_string();
        let mut inner = self.inner.write();
        if let Some(&idx) = inner.template_index.get(&key) {
            tracing::debug!(uri_template = %key, "replacing registered resource template");
            inner.templates[idx] = template;
            return false;
        }
        let idx = inner.templates.len();
        inner.templates.push(template);
        inner.template_index.insert(key.clone(), idx);
        self.revision.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(uri_template = %key, "registered resource template");
        true
    }

    /// Monotonic counter of identifiers added so far.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Snapshot of the live tools in registration order.
    pub fn tools(&self) -> Vec<ServerTool> {
        self.inner.read().tools.clone()
    }

    /// Names of the live tools in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.inner
            .read()
            .tools
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    /// Look up a live tool by name.
    pub fn tool(&self, name: &str) -> Option<ServerTool> {
        let inner = self.inner.read();
        inner.tool_index.get(name).map(|&i| inner.tools[i].clone())
    }

    /// Whether a tool with this name is live.
    pub fn contains_tool(&self, name: &str) -> bool {
        self.inner.read().tool_index.contains_key(name)
    }

    /// Number of live tools.
    pub fn len(&self) -> usize {
        self.inner.read().tools.len()
    }

    /// True if no tool is live.
    pub fn is_empty(&self) -> bool {
        self.inner.read().tools.is_empty()
    }

    /// Snapshot of the live resource templates in registration order.
    pub fn resource_templates(&self) -> Vec<ResourceTemplate> {
        self.inner.read().templates.clone()
    }

    /// Dispatch a tool call by name.
    ///
    /// The lock is released before the handler runs, so handlers may register
    /// further capabilities on this host.
    pub fn call_tool(
        &self,
        name: &str,
        args: Value,
        ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<crate::FormattedResult, ToolError>> {
        match self.tool(name) {
            Some(tool) => tool.call(args, ctx),
            None => {
                let msg = format!("unknown tool: {name}");
                Box::pin(async move { Err(ToolError::NotFound(msg)) })
            }
        }
    }

    /// Read a resource through the first live template whose pattern matches `uri`.
    pub fn read_resource(
        &self,
        uri: &str,
        ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<Vec<ResourceContents>, ToolError>> {
        let templates = self.resource_templates();
        if let Some(fut) = templates.iter().find_map(|t| t.read(uri, ctx)) {
            return fut;
        }
        let msg = format!("no resource template matches {uri}");
        Box::pin(async move { Err(ToolError::NotFound(msg)) })
    }
}

impl HostServer for LiveCapabilities {
    fn add_tool(&self, tool: ServerTool) {
        self.insert_tool(tool);
    }

    fn add_resource_template(&self, template: ResourceTemplate) {
        self.insert_resource_template(template);
    }
}
