//! The collection of toolsets a server was built with.

use crate::capability::ServerTool;
use crate::error::ToolsetError;
use crate::host::HostServer;
use crate::toolset::Toolset;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Sentinel name that turns every toolset on.
pub const ALL_TOOLSETS: &str = "all";

/// Toolsets keyed by name, with a group-wide read-only policy.
#[derive(Debug, Default)]
pub struct ToolsetGroup {
    toolsets: HashMap<String, Toolset>,
    read_only: bool,
    everything_on: bool,
}

impl ToolsetGroup {
    /// Create an empty group. A read-only group marks every toolset it receives read-only.
    pub fn new(read_only: bool) -> Self {
        Self {
            toolsets: HashMap::new(),
            read_only,
            everything_on: false,
        }
    }

    /// Attach a toolset. A toolset with the same name is replaced.
    pub fn add_toolset(&mut self, mut toolset: Toolset) -> Result<(), ToolsetError> {
        if toolset.name() == ALL_TOOLSETS {
            return Err(ToolsetError::ReservedName {
                name: ALL_TOOLSETS.to_string(),
            });
        }
        if self.read_only {
            toolset.mark_read_only();
        }
        self.toolsets.insert(toolset.name().to_string(), toolset);
        Ok(())
    }

    /// True once `"all"` was enabled, else the named toolset's own flag.
    ///
    /// Unknown names are simply not enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        if self.everything_on {
            return true;
        }
        self.toolsets.get(name).is_some_and(Toolset::is_enabled)
    }

    /// Enable one toolset, or everything via [`ALL_TOOLSETS`].
    pub fn enable_toolset(&mut self, name: &str) -> Result<(), ToolsetError> {
        if name == ALL_TOOLSETS {
            self.everything_on = true;
            return Ok(());
        }
        let toolset = self
            .toolsets
            .get_mut(name)
            .ok_or_else(|| ToolsetError::not_found(name))?;
        toolset.enable();
        Ok(())
    }

    /// Enable toolsets in order, stopping at the first unknown name.
    ///
    /// Toolsets enabled before the failure stay enabled.
    pub fn enable_toolsets<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), ToolsetError> {
        for name in names {
            self.enable_toolset(name.as_ref())?;
        }
        Ok(())
    }

    /// Register every toolset with the host, in name order. Disabled toolsets
    /// contribute nothing.
    pub fn register_with(&self, host: &dyn HostServer) {
        for name in self.names() {
            if let Some(toolset) = self.toolsets.get(&name) {
                toolset.register_with(host);
            }
        }
    }

    pub fn toolset(&self, name: &str) -> Option<&Toolset> {
        self.toolsets.get(name)
    }

    pub fn toolset_mut(&mut self, name: &str) -> Option<&mut Toolset> {
        self.toolsets.get_mut(name)
    }

    /// Names of every attached toolset, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.toolsets.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.toolsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toolsets.is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_everything_on(&self) -> bool {
        self.everything_on
    }
}

/// What enabling a toolset at runtime did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    /// The toolset was off and its tools are now live.
    Enabled,
    /// Nothing to do.
    AlreadyEnabled,
}

/// A [`ToolsetGroup`] shared between the startup code and live tool handlers.
#[derive(Debug, Clone, Default)]
pub struct SharedToolsetGroup {
    inner: Arc<RwLock<ToolsetGroup>>,
}

impl SharedToolsetGroup {
    pub fn new(group: ToolsetGroup) -> Self {
        Self {
            inner: Arc::new(RwLock::new(group)),
        }
    }

    /// Run `f` with shared access to the group.
    pub fn read<R>(&self, f: impl FnOnce(&ToolsetGroup) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access to the group.
    pub fn write<R>(&self, f: impl FnOnce(&mut ToolsetGroup) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn downgrade(&self) -> WeakToolsetGroup {
        WeakToolsetGroup {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Enable `name` and publish its active tools to `host`.
    ///
    /// The group lock is held across the flag flip and the publish, so two
    /// concurrent calls for the same name register the tools once, and no
    /// reader sees the toolset enabled before its tools are live.
    pub fn enable_and_publish(
        &self,
        name: &str,
        host: &dyn HostServer,
    ) -> Result<EnableOutcome, ToolsetError> {
        let mut group = self.inner.write();
        let toolset = group
            .toolset_mut(name)
            .ok_or_else(|| ToolsetError::not_found(name))?;
        if toolset.is_enabled() {
            return Ok(EnableOutcome::AlreadyEnabled);
        }
        toolset.enable();
        let active: Vec<ServerTool> = toolset.active_tools();
        tracing::info!(toolset = %name, tools = active.len(), "enabled toolset");
        host.add_tools(active);
        Ok(EnableOutcome::Enabled)
    }
}

/// Non-owning handle to a [`SharedToolsetGroup`].
#[derive(Debug, Clone, Default)]
pub struct WeakToolsetGroup {
    inner: std::sync::Weak<RwLock<ToolsetGroup>>,
}

impl WeakToolsetGroup {
    pub fn upgrade(&self) -> Option<SharedToolsetGroup> {
        self.inner.upgrade().map(|inner| SharedToolsetGroup { inner })
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
    use serde_json::Value;

    fn tool(name: &str) -> ServerTool {
        ServerTool::new(
            ToolDescriptor::new(name, name),
            |_args: Value,
             _ctx: &ToolContext|
             -> BoxFuture<'static, Result<FormattedResult, ToolError>> {
                Box::pin(async { Ok(FormattedResult::text("ok")) })
            },
        )
    }

    fn repos() -> Toolset {
        Toolset::builder("repos", "Repositories")
            .read_tool(tool("search_repositories"))
            .write_tool(tool("create_repository"))
            .finish()
    }

    #[test]
    fn all_is_reserved() {
        let mut group = ToolsetGroup::new(false);
        let err = group.add_toolset(Toolset::new("all", "nope")).unwrap_err();
        assert_eq!(err, ToolsetError::ReservedName { name: "all".into() });
        assert!(group.is_empty());
    }

    #[test]
    fn read_only_group_marks_members() {
        let mut group = ToolsetGroup::new(true);
        group.add_toolset(repos()).unwrap();
        let ts = group.toolset("repos").unwrap();
        assert!(ts.is_read_only());
        assert!(ts.write_tools().is_empty());

        group
            .toolset_mut("repos")
            .unwrap()
            .add_write_tools([tool("late_write")]);
        let available: Vec<String> = group
            .toolset("repos")
            .unwrap()
            .available_tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(available, vec!["search_repositories"]);
    }

    #[test]
    fn last_add_wins() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(repos()).unwrap();
        group.add_toolset(Toolset::new("repos", "Replaced")).unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group.toolset("repos").unwrap().description(), "Replaced");
    }

    #[test]
    fn unknown_names_are_not_enabled() {
        let group = ToolsetGroup::new(false);
        assert!(!group.is_enabled("missing"));
    }

    #[test]
    fn enable_all_covers_unknown_and_later_toolsets() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(repos()).unwrap();
        group.enable_toolset(ALL_TOOLSETS).unwrap();
        assert!(group.is_everything_on());
        assert!(group.is_enabled("repos"));
        assert!(group.is_enabled("never_added"));

        group.add_toolset(Toolset::new("issues", "Issues")).unwrap();
        assert!(group.is_enabled("issues"));
        // the override does not flip individual flags
        assert!(!group.toolset("repos").unwrap().is_enabled());
    }

    #[test]
    fn enable_unknown_leaves_group_unchanged() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(repos()).unwrap();
        group.add_toolset(Toolset::new("issues", "Issues")).unwrap();
        group.enable_toolset("issues").unwrap();
        let flags = |g: &ToolsetGroup| -> Vec<(String, bool)> {
            g.names()
                .into_iter()
                .map(|n| {
                    let on = g.is_enabled(&n);
                    (n, on)
                })
                .collect()
        };
        let before = flags(&group);

        let err = group.enable_toolset("pulls").unwrap_err();
        assert_eq!(err.to_string(), "Toolset pulls not found");
        assert_eq!(group.len(), 2);
        assert_eq!(flags(&group), before);
        assert!(group.toolset("pulls").is_none());
        assert!(!group.is_everything_on());
    }

    #[test]
    fn enable_toolsets_is_fail_fast_without_rollback() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(repos()).unwrap();
        group.add_toolset(Toolset::new("issues", "Issues")).unwrap();

        let err = group
            .enable_toolsets(&["repos", "nope", "issues"])
            .unwrap_err();
        assert_eq!(err, ToolsetError::not_found("nope"));
        assert!(group.is_enabled("repos"));
        assert!(!group.is_enabled("issues"));
    }

    #[test]
    fn names_are_sorted() {
        let mut group = ToolsetGroup::new(false);
        for n in ["pulls", "issues", "repos"] {
            group.add_toolset(Toolset::new(n, n)).unwrap();
        }
        assert_eq!(group.names(), vec!["issues", "pulls", "repos"]);
    }

    #[test]
    fn register_with_only_enabled_members() {
        let mut group = ToolsetGroup::new(false);
        group.add_toolset(repos()).unwrap();
        group
            .add_toolset(
                Toolset::builder("issues", "Issues")
                    .read_tool(tool("get_issue"))
                    .finish(),
            )
            .unwrap();
        group.enable_toolset("issues").unwrap();

        let host = LiveCapabilities::new();
        group.register_with(&host);
        assert_eq!(host.tool_names(), vec!["get_issue"]);
    }

    #[test]
    fn enable_and_publish_reports_outcome() {
        let shared = SharedToolsetGroup::new(ToolsetGroup::new(false));
        shared.write(|g| g.add_toolset(repos())).unwrap();
        let host = LiveCapabilities::new();

        assert_eq!(
            shared.enable_and_publish("repos", &host).unwrap(),
            EnableOutcome::Enabled
        );
        assert_eq!(
            shared.enable_and_publish("repos", &host).unwrap(),
            EnableOutcome::AlreadyEnabled
        );
        assert_eq!(
            host.tool_names(),
            vec!["search_repositories", "create_repository"]
        );
        assert!(shared.read(|g| g.is_enabled("repos")));

        let err = shared.enable_and_publish("nope", &host).unwrap_err();
        assert_eq!(err, ToolsetError::not_found("nope"));
    }

    #[test]
    fn weak_handle_does_not_keep_group_alive() {
        let shared = SharedToolsetGroup::default();
        let weak = shared.downgrade();
        assert!(weak.upgrade().is_some());
        drop(shared);
        assert!(weak.upgrade().is_none());
    }
}
