//! Tools that let a client discover and enable toolsets mid-session.
//!
//! They live in their own `dynamic` toolset as ordinary read tools. Each one
//! holds weak handles to the group and the host: the host owns these tools,
//! so strong handles would form a cycle.

use crate::capability::ServerTool;
use crate::context::ToolContext;
use crate::error::{ToolError, ToolsetError};
use crate::fmt::{TextFormat, TextOptions};
use crate::group::{EnableOutcome, SharedToolsetGroup, WeakToolsetGroup};
use crate::host::HostServer;
use crate::schema::{FieldConstraint, SchemaEngine};
use crate::tool::Tool;
use crate::toolset::Toolset;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

/// Name of the toolset carrying the discovery tools.
pub const DYNAMIC_TOOLSET: &str = "dynamic";

pub const LIST_AVAILABLE_TOOLSETS: &str = "list_available_toolsets";
pub const GET_TOOLSET_TOOLS: &str = "get_toolset_tools";
pub const ENABLE_TOOLSET: &str = "enable_toolset";

/// Build the `dynamic` toolset for `group`, publishing into `host`.
///
/// The `toolset` argument of the discovery tools is restricted to the names
/// attached to the group at this point, so attach this toolset last. The
/// `dynamic` toolset itself is not part of the enum.
pub fn dynamic_toolset(group: &SharedToolsetGroup, host: &Arc<dyn HostServer>) -> Toolset {
    let names: Vec<serde_json::Value> = group
        .read(|g| g.names())
        .into_iter()
        .map(serde_json::Value::String)
        .collect();

    let mut engine = SchemaEngine::new().with_strict(true);
    for tool in [GET_TOOLSET_TOOLS, ENABLE_TOOLSET] {
        engine = engine
            .with_constraint(
                tool,
                &["properties", "toolset"],
                FieldConstraint::Enum(names.clone()),
            )
            .with_constraint(
                tool,
                &["properties", "toolset"],
                FieldConstraint::MergePatch(json!({"nullable": null})),
            )
            .with_constraint(
                tool,
                &[],
                FieldConstraint::MergePatch(json!({"required": ["toolset"]})),
            );
    }

    let weak_group = group.downgrade();
    Toolset::builder(
        DYNAMIC_TOOLSET,
        "Discover tools that can help achieve tasks by enabling additional sets of tools. With this toolset enabled you control which other toolsets are active.",
    )
    .read_tool(ServerTool::from_tool_with_schema::<ListAvailableToolsets, ()>(
        ListAvailableToolsets {
            group: weak_group.clone(),
        },
        &engine,
    ))
    .read_tool(ServerTool::from_tool_with_schema::<GetToolsetTools, ()>(
        GetToolsetTools {
            group: weak_group.clone(),
        },
        &engine,
    ))
    .read_tool(ServerTool::from_tool_with_schema::<EnableToolset, ()>(
        EnableToolset {
            group: weak_group,
            host: Arc::downgrade(host),
        },
        &engine,
    ))
    .finish()
}

/// Arguments of the discovery tools that act on one toolset.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ToolsetArgs {
    /// The name of the toolset
    #[serde(default)]
    pub toolset: Option<String>,
}

impl ToolsetArgs {
    fn require_toolset(self) -> Result<String, ToolError> {
        self.toolset
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ToolError::missing_parameter("toolset"))
    }
}

/// No arguments.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoArgs {}

/// Toolset name to enabled flag, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ToolsetFlags(pub BTreeMap<String, bool>);

impl TextFormat for ToolsetFlags {}

/// Tool name to description, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ToolDescriptions(pub BTreeMap<String, String>);

impl TextFormat for ToolDescriptions {}

/// Result of `enable_toolset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnableReport {
    pub toolset: String,
    pub enabled: bool,
    pub already_enabled: bool,
}

impl TextFormat for EnableReport {
    fn fmt_text(&self, _opts: &TextOptions) -> String {
        if self.already_enabled {
            format!("Toolset {} is already enabled", self.toolset)
        } else {
            format!("Toolset {} enabled", self.toolset)
        }
    }
}

fn group_gone() -> ToolError {
    ToolError::internal("toolset group is no longer available")
}

/// Lists every known toolset and whether it is enabled.
#[derive(Debug, Clone)]
pub struct ListAvailableToolsets {
    group: WeakToolsetGroup,
}

impl Tool for ListAvailableToolsets {
    type Input = NoArgs;
    type Output = ToolsetFlags;
    const NAME: &'static str = LIST_AVAILABLE_TOOLSETS;
    const DESCRIPTION: &'static str = "List available toolsets this MCP server can offer, providing the enabled status of each. Use this when the currently available tools aren't enough for a task. Call get_toolset_tools with these toolset names to discover specific tools you can call";
    const TITLE: Option<&'static str> = Some("List available toolsets");
    const READ_ONLY: bool = true;

    fn call(
        &self,
        _input: NoArgs,
        _ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<ToolsetFlags, ToolError>> {
        let result = self.group.upgrade().ok_or_else(group_gone).map(|group| {
            group.read(|g| {
                ToolsetFlags(
                    g.names()
                        .into_iter()
                        .map(|name| {
                            let on = g.is_enabled(&name);
                            (name, on)
                        })
                        .collect(),
                )
            })
        });
        Box::pin(async move { result })
    }
}

/// Lists the tools a toolset currently exposes.
#[derive(Debug, Clone)]
pub struct GetToolsetTools {
    group: WeakToolsetGroup,
}

impl GetToolsetTools {
    fn describe(&self, input: ToolsetArgs) -> Result<ToolDescriptions, ToolError> {
        let name = input.require_toolset()?;
        let group = self.group.upgrade().ok_or_else(group_gone)?;
        group.read(|g| -> Result<ToolDescriptions, ToolError> {
            let toolset = g
                .toolset(&name)
                .ok_or_else(|| ToolsetError::not_found(&name))?;
            Ok(ToolDescriptions(
                toolset
                    .active_tools()
                    .iter()
                    .map(|t| (t.name().to_string(), t.description().to_string()))
                    .collect(),
            ))
        })
    }
}

impl Tool for GetToolsetTools {
    type Input = ToolsetArgs;
    type Output = ToolDescriptions;
    const NAME: &'static str = GET_TOOLSET_TOOLS;
    const DESCRIPTION: &'static str = "Lists the tools a toolset exposes while enabled. Use this to get clarity on whether enabling a toolset would help you to complete a task";
    const TITLE: Option<&'static str> = Some("List all tools in a toolset");
    const READ_ONLY: bool = true;

    fn call(
        &self,
        input: ToolsetArgs,
        _ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<ToolDescriptions, ToolError>> {
        let result = self.describe(input);
        Box::pin(async move { result })
    }
}

/// Enables a toolset and publishes its tools to the live server.
#[derive(Clone)]
pub struct EnableToolset {
    group: WeakToolsetGroup,
    host: Weak<dyn HostServer>,
}

impl std::fmt::Debug for EnableToolset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnableToolset").finish_non_exhaustive()
    }
}

impl EnableToolset {
    fn enable(&self, input: ToolsetArgs) -> Result<EnableReport, ToolError> {
        let name = input.require_toolset()?;
        let group = self.group.upgrade().ok_or_else(group_gone)?;
        let host = self
            .host
            .upgrade()
            .ok_or_else(|| ToolError::internal("host server is no longer available"))?;
        let outcome = group.enable_and_publish(&name, host.as_ref())?;
        Ok(EnableReport {
            enabled: true,
            already_enabled: outcome == EnableOutcome::AlreadyEnabled,
            toolset: name,
        })
    }
}

impl Tool for EnableToolset {
    type Input = ToolsetArgs;
    type Output = EnableReport;
    const NAME: &'static str = ENABLE_TOOLSET;
    const DESCRIPTION: &'static str = "Enable one of the sets of tools this server provides. Use get_toolset_tools and list_available_toolsets first to see what this will enable";
    const TITLE: Option<&'static str> = Some("Enable a toolset");
    const READ_ONLY: bool = true;

    fn call(
        &self,
        input: ToolsetArgs,
        _ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<EnableReport, ToolError>> {
        let result = self.enable(input);
        Box::pin(async move { result })
    }
}
