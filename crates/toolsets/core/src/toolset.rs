//! A named bundle of tools with an enable flag and a read-only policy.

use crate::capability::{ResourceTemplate, ServerTool};
use crate::host::HostServer;

/// Named, independently enablable group of tools and resource templates.
///
/// Read tools are always exposed once enabled. Write tools are exposed only
/// while the toolset is not read-only, and once a toolset is read-only it
/// never accepts write tools again: [`Toolset::add_write_tools`] silently
/// drops them.
#[derive(Debug, Clone)]
pub struct Toolset {
    name: String,
    description: String,
    enabled: bool,
    read_only: bool,
    read_tools: Vec<ServerTool>,
    write_tools: Vec<ServerTool>,
    resource_templates: Vec<ResourceTemplate>,
}

impl Toolset {
    /// Create an empty, disabled, writable toolset.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            enabled: false,
            read_only: false,
            read_tools: vec![],
            write_tools: vec![],
            resource_templates: vec![],
        }
    }

    /// Start building a toolset.
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> ToolsetBuilder {
        ToolsetBuilder {
            toolset: Self::new(name, description),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Append read tools. Always succeeds.
    pub fn add_read_tools(&mut self, tools: impl IntoIterator<Item = ServerTool>) {
        self.read_tools.extend(tools);
    }

    /// Append write tools, unless the toolset is read-only.
    pub fn add_write_tools(&mut self, tools: impl IntoIterator<Item = ServerTool>) {
        if self.read_only {
            return;
        }
        self.write_tools.extend(tools);
    }

    /// Append resource templates. Unaffected by the read-only policy.
    pub fn add_resource_templates(&mut self, templates: impl IntoIterator<Item = ResourceTemplate>) {
        self.resource_templates.extend(templates);
    }

    /// Forbid write tools from now on. Idempotent.
    ///
    /// Write tools added before this call are discarded.
    pub fn mark_read_only(&mut self) {
        self.read_only = true;
        self.write_tools.clear();
    }

    /// Enable the toolset. There is no way back.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn read_tools(&self) -> &[ServerTool] {
        &self.read_tools
    }

    pub fn write_tools(&self) -> &[ServerTool] {
        &self.write_tools
    }

    pub fn resource_templates(&self) -> &[ResourceTemplate] {
        &self.resource_templates
    }

    /// Tools the client should see right now: nothing while disabled.
    pub fn active_tools(&self) -> Vec<ServerTool> {
        if !self.enabled {
            return vec![];
        }
        self.available_tools()
    }

    /// Tools the toolset would expose if enabled.
    pub fn available_tools(&self) -> Vec<ServerTool> {
        let mut tools = self.read_tools.clone();
        if !self.read_only {
            tools.extend(self.write_tools.iter().cloned());
        }
        tools
    }

    /// Push this toolset's capabilities into `host`, if enabled.
    pub fn register_with(&self, host: &dyn HostServer) {
        if !self.enabled {
            return;
        }
        tracing::debug!(
            toolset = %self.name,
            read = self.read_tools.len(),
            write = if self.read_only { 0 } else { self.write_tools.len() },
            templates = self.resource_templates.len(),
            "registering toolset"
        );
        for tool in &self.read_tools {
            host.add_tool(tool.clone());
        }
        if !self.read_only {
            for tool in &self.write_tools {
                host.add_tool(tool.clone());
            }
        }
        for template in &self.resource_templates {
            host.add_resource_template(template.clone());
        }
    }
}

/// Builder for [`Toolset`].
///
/// Once [`ToolsetBuilder::read_only`] has been called, later write tools are
/// dropped the same way [`Toolset::add_write_tools`] drops them.
#[derive(Debug)]
#[must_use]
pub struct ToolsetBuilder {
    toolset: Toolset,
}

impl ToolsetBuilder {
    pub fn read_tool(mut self, tool: ServerTool) -> Self {
        self.toolset.add_read_tools([tool]);
        self
    }

    pub fn read_tools(mut self, tools: impl IntoIterator<Item = ServerTool>) -> Self {
        self.toolset.add_read_tools(tools);
        self
    }

    pub fn write_tool(mut self, tool: ServerTool) -> Self {
        self.toolset.add_write_tools([tool]);
        self
    }

    pub fn write_tools(mut self, tools: impl IntoIterator<Item = ServerTool>) -> Self {
        self.toolset.add_write_tools(tools);
        self
    }

    pub fn resource_template(mut self, template: ResourceTemplate) -> Self {
        self.toolset.add_resource_templates([template]);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.toolset.mark_read_only();
        self
    }

    /// Finish building. The toolset starts disabled.
    pub fn finish(self) -> Toolset {
        self.toolset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{FormattedResult, ToolDescriptor};
    use crate::context::ToolContext;
    use crate::error::ToolError;
    use crate::host::LiveCapabilities;
    use futures::future::BoxFuture;
    use proptest::prelude::*;
    use serde_json::Value;

    fn tool(name: &str) -> ServerTool {
        ServerTool::new(
            ToolDescriptor::new(name, format!("{name} description")),
            |_args: Value,
             _ctx: &ToolContext|
             -> BoxFuture<'static, Result<FormattedResult, ToolError>> {
                Box::pin(async { Ok(FormattedResult::text("ok")) })
            },
        )
    }

    fn names(tools: &[ServerTool]) -> Vec<&str> {
        tools.iter().map(ServerTool::name).collect()
    }

    #[test]
    fn disabled_toolset_exposes_nothing() {
        let ts = Toolset::builder("repos", "Repositories")
            .read_tool(tool("get_repo"))
            .write_tool(tool("create_repo"))
            .finish();
        assert!(ts.active_tools().is_empty());
        assert_eq!(names(&ts.available_tools()), vec!["get_repo", "create_repo"]);
    }

    #[test]
    fn enabled_writable_lists_reads_then_writes() {
        let mut ts = Toolset::new("repos", "Repositories");
        ts.add_write_tools([tool("w1")]);
        ts.add_read_tools([tool("r1"), tool("r2")]);
        ts.enable();
        assert_eq!(names(&ts.active_tools()), vec!["r1", "r2", "w1"]);
    }

    #[test]
    fn read_only_enabled_exposes_read_tools_in_order() {
        let mut ts = Toolset::builder("repos", "Repositories")
            .read_only()
            .read_tools([tool("b"), tool("a")])
            .write_tool(tool("w"))
            .finish();
        ts.enable();
        assert!(ts.write_tools().is_empty());
        assert_eq!(names(&ts.active_tools()), vec!["b", "a"]);
        assert_eq!(names(&ts.available_tools()), vec!["b", "a"]);
    }

    #[test]
    fn mark_read_only_is_idempotent_and_drops_writes() {
        let mut ts = Toolset::builder("repos", "Repositories")
            .write_tool(tool("w"))
            .finish();
        ts.mark_read_only();
        ts.mark_read_only();
        assert!(ts.is_read_only());
        assert!(ts.write_tools().is_empty());
        ts.add_write_tools([tool("w2")]);
        assert!(ts.write_tools().is_empty());
    }

    #[test]
    fn register_with_skips_disabled() {
        let host = LiveCapabilities::new();
        let ts = Toolset::builder("repos", "Repositories")
            .read_tool(tool("r"))
            .finish();
        ts.register_with(&host);
        assert!(host.is_empty());
    }

    #[test]
    fn register_with_pushes_reads_writes_and_templates() {
        use crate::capability::{ResourceContents, ResourceTemplateDescriptor};
        use std::collections::HashMap;

        let template = ResourceTemplate::new(
            ResourceTemplateDescriptor::new("repo://{owner}", "repo"),
            |_uri: &str,
             _vars: &HashMap<String, String>,
             _ctx: &ToolContext|
             -> BoxFuture<'static, Result<Vec<ResourceContents>, ToolError>> {
                Box::pin(async { Ok(vec![]) })
            },
        );
        let mut ts = Toolset::builder("repos", "Repositories")
            .write_tool(tool("w"))
            .read_tool(tool("r"))
            .resource_template(template)
            .read_only()
            .finish();
        ts.enable();

        let host = LiveCapabilities::new();
        ts.register_with(&host);
        assert_eq!(host.tool_names(), vec!["r"]);
        assert_eq!(host.resource_templates().len(), 1);
    }

    proptest! {
        #[test]
        fn read_only_never_grows_write_list(batches in prop::collection::vec(0usize..4, 0..6)) {
            let mut ts = Toolset::new("t", "t");
            ts.mark_read_only();
            for (i, n) in batches.into_iter().enumerate() {
                ts.add_write_tools((0..n).map(|j| tool(&format!("w{i}_{j}"))));
                prop_assert_eq!(ts.write_tools().len(), 0);
            }
        }

        #[test]
        fn available_is_independent_of_enabled(reads in 0usize..4, writes in 0usize..4, ro: bool) {
            let mut ts = Toolset::new("t", "t");
            ts.add_read_tools((0..reads).map(|i| tool(&format!("r{i}"))));
            ts.add_write_tools((0..writes).map(|i| tool(&format!("w{i}"))));
            if ro {
                ts.mark_read_only();
            }
            let before: Vec<String> =
                ts.available_tools().iter().map(|t| t.name().to_string()).collect();
            ts.enable();
            let after: Vec<String> =
                ts.available_tools().iter().map(|t| t.name().to_string()).collect();
            prop_assert_eq!(&before, &after);
            prop_assert_eq!(ts.active_tools().len(), after.len());
        }
    }
}
