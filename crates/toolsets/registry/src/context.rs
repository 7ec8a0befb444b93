//! The always-on `context` toolset.

use serde::{Deserialize, Serialize};
use toolsets_core::{
    BoxFuture, ServerTool, TextFormat, Tool, ToolContext, ToolError, Toolset, WeakToolsetGroup,
};

pub const CONTEXT_TOOLSET: &str = "context";

/// Build the `context` toolset.
pub fn context_toolset(info: ServerIdentity, group: WeakToolsetGroup) -> Toolset {
    Toolset::builder(
        CONTEXT_TOOLSET,
        "Tools that provide context about the server you are operating in",
    )
    .read_tool(ServerTool::from_tool::<GetServerInfo, ()>(GetServerInfo {
        info,
        group,
    }))
    .finish()
}

/// Static facts about the running server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
    pub read_only: bool,
    pub dynamic_toolsets: bool,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GetServerInfoInput {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub read_only: bool,
    pub dynamic_toolsets: bool,
    /// Sorted; every attached toolset once `all` was enabled.
    pub enabled_toolsets: Vec<String>,
}

impl TextFormat for ServerInfo {}

#[derive(Debug, Clone)]
pub struct GetServerInfo {
    info: ServerIdentity,
    group: WeakToolsetGroup,
}

impl Tool for GetServerInfo {
    type Input = GetServerInfoInput;
    type Output = ServerInfo;
    const NAME: &'static str = "get_server_info";
    const DESCRIPTION: &'static str = "Get details about this server: its name and version, whether it is read-only, and which toolsets are enabled";
    const TITLE: Option<&'static str> = Some("Get server info");
    const READ_ONLY: bool = true;

    fn call(
        &self,
        _input: GetServerInfoInput,
        _ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<ServerInfo, ToolError>> {
        let result = self
            .group
            .upgrade()
            .ok_or_else(|| ToolError::internal("toolset group is no longer available"))
            .map(|group| {
                let enabled_toolsets = group.read(|g| {
                    g.names()
                        .into_iter()
                        .filter(|n| g.is_enabled(n))
                        .collect()
                });
                ServerInfo {
                    name: self.info.name.clone(),
                    version: self.info.version.clone(),
                    read_only: self.info.read_only,
                    dynamic_toolsets: self.info.dynamic_toolsets,
                    enabled_toolsets,
                }
            });
        Box::pin(async move { result })
    }
}
