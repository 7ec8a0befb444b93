//! Startup wiring for a toolsets server.
//!
//! [`init_toolsets`] builds the [`ToolsetGroup`] a server runs with: the
//! built-in `context` and `experiments` toolsets, whatever a
//! [`ToolsetCatalog`] contributes, and the `dynamic` discovery toolset
//! attached last. It then enables the requested names and registers every
//! enabled toolset with the host.
//!
//! # Example
//!
//! ```ignore
//! use toolsets_registry::{ToolsetOptions, init_toolsets};
//!
//! let live = Arc::new(LiveCapabilities::new());
//! let host: Arc<dyn HostServer> = Arc::clone(&live) as Arc<dyn HostServer>;
//! let group = init_toolsets(&host, &ToolsetOptions::default(), &())?;
//! let server = ToolsetServer::new(live).with_group(group);
//! ```

mod context;

pub use context::{CONTEXT_TOOLSET, ServerIdentity, ServerInfo, context_toolset};

use serde::Serialize;
use std::sync::Arc;
use toolsets_core::{
    ALL_TOOLSETS, DYNAMIC_TOOLSET, HostServer, SharedToolsetGroup, Toolset, ToolsetError,
    ToolsetGroup, dynamic_toolset,
};
use tracing::{info, warn};

pub const EXPERIMENTS_TOOLSET: &str = "experiments";

/// Source of the domain toolsets a server offers.
///
/// A catalog owns whatever clients its tool handlers need; the registry only
/// sees the finished toolsets.
pub trait ToolsetCatalog {
    /// Toolsets to attach, in order. Later duplicates replace earlier ones.
    fn toolsets(&self) -> Vec<Toolset>;
}

/// No domain toolsets: only the built-ins.
impl ToolsetCatalog for () {
    fn toolsets(&self) -> Vec<Toolset> {
        vec![]
    }
}

impl ToolsetCatalog for Vec<Toolset> {
    fn toolsets(&self) -> Vec<Toolset> {
        self.clone()
    }
}

/// How the group should start.
#[derive(Debug, Clone)]
pub struct ToolsetOptions {
    /// Toolset names to enable. `"all"` enables every attached toolset.
    pub enabled: Vec<String>,
    /// Strip write tools from every toolset.
    pub read_only: bool,
    /// Start with only the discovery tools and let the client enable the rest.
    pub dynamic_toolsets: bool,
    /// Server name reported by `get_server_info`.
    pub server_name: String,
    /// Server version reported by `get_server_info`.
    pub server_version: String,
}

impl Default for ToolsetOptions {
    fn default() -> Self {
        Self {
            enabled: vec![ALL_TOOLSETS.to_string()],
            read_only: false,
            dynamic_toolsets: false,
            server_name: "toolsets".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Build the toolset group, enable the requested toolsets and register them with `host`.
///
/// Fails if a catalog toolset uses the reserved name `all`, or if a requested
/// name is unknown. Toolsets enabled before the unknown name stay enabled, but
/// nothing is registered with the host.
///
/// The discovery tools and `get_server_info` only hold a weak handle to the
/// returned group. Keep it alive for as long as the host serves them, for
/// example with `toolsets_mcp::ToolsetServer::with_group`. Once it is dropped
/// those tools answer with an internal error.
#[must_use = "dropping the group disables the discovery tools"]
pub fn init_toolsets(
    host: &Arc<dyn HostServer>,
    options: &ToolsetOptions,
    catalog: &dyn ToolsetCatalog,
) -> Result<SharedToolsetGroup, ToolsetError> {
    let group = SharedToolsetGroup::new(ToolsetGroup::new(options.read_only));

    let identity = ServerIdentity {
        name: options.server_name.clone(),
        version: options.server_version.clone(),
        read_only: options.read_only,
        dynamic_toolsets: options.dynamic_toolsets,
    };
    let weak = group.downgrade();
    group.write(|g| g.add_toolset(context_toolset(identity, weak)))?;
    for toolset in catalog.toolsets() {
        group.write(|g| g.add_toolset(toolset))?;
    }
    // Always present so naming it never fails
    group.write(|g| {
        g.add_toolset(Toolset::new(
            EXPERIMENTS_TOOLSET,
            "Experimental features that are not considered stable yet",
        ))
    })?;

    // Attached last so its enum covers every other toolset
    let dynamic = dynamic_toolset(&group, host);
    group.write(|g| g.add_toolset(dynamic))?;

    let names = startup_names(&options.enabled, options.dynamic_toolsets);
    group.write(|g| {
        g.enable_toolsets(&names)?;
        if g.is_everything_on() {
            // "all" only answers is_enabled; registration reads each toolset's own flag
            for name in g.names() {
                g.enable_toolset(&name)?;
            }
        }
        Ok::<_, ToolsetError>(())
    })?;

    group.read(|g| {
        info!(
            toolsets = ?g.names().into_iter().filter(|n| g.is_enabled(n)).collect::<Vec<_>>(),
            read_only = g.is_read_only(),
            dynamic = options.dynamic_toolsets,
            "toolsets initialized"
        );
        g.register_with(host.as_ref());
    });

    Ok(group)
}

/// The names actually enabled at startup.
///
/// Trims and drops empty names, always includes `context`, and in dynamic
/// mode swaps `all` for `dynamic`.
fn startup_names(requested: &[String], dynamic_mode: bool) -> Vec<String> {
    let mut names: Vec<String> = vec![CONTEXT_TOOLSET.to_string()];
    for name in requested {
        let name = name.trim();
        if name.is_empty() || names.iter().any(|n| n == name) {
            continue;
        }
        if dynamic_mode && name == ALL_TOOLSETS {
            warn!("ignoring \"all\" in dynamic toolsets mode; enable toolsets through the dynamic tools instead");
            continue;
        }
        names.push(name.to_string());
    }
    if dynamic_mode && !names.iter().any(|n| n == DYNAMIC_TOOLSET) {
        names.push(DYNAMIC_TOOLSET.to_string());
    }
    names
}

/// One row of a toolset listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolsetSummary {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub read_only: bool,
    /// Tools the toolset exposes when enabled.
    pub tools: usize,
}

/// Describe every toolset in the group, sorted by name.
pub fn summarize(group: &SharedToolsetGroup) -> Vec<ToolsetSummary> {
    group.read(|g| {
        g.names()
            .into_iter()
            .filter_map(|name| {
                let ts = g.toolset(&name)?;
                Some(ToolsetSummary {
                    enabled: g.is_enabled(&name),
                    description: ts.description().to_string(),
                    read_only: ts.is_read_only(),
                    tools: ts.available_tools().len(),
                    name,
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| (*x).to_string()).collect()
    }

    #[test]
    fn startup_names_always_include_context() {
        assert_eq!(startup_names(&[], false), s(&["context"]));
        assert_eq!(
            startup_names(&s(&["repos", "context"]), false),
            s(&["context", "repos"])
        );
    }

    #[test]
    fn startup_names_trim_and_dedupe() {
        assert_eq!(
            startup_names(&s(&[" repos ", "", "repos"]), false),
            s(&["context", "repos"])
        );
    }

    #[test]
    fn dynamic_mode_drops_all_and_adds_dynamic() {
        assert_eq!(
            startup_names(&s(&["all", "issues"]), true),
            s(&["context", "issues", "dynamic"])
        );
        assert_eq!(
            startup_names(&s(&["dynamic"]), true),
            s(&["context", "dynamic"])
        );
    }

    #[test]
    fn all_kept_outside_dynamic_mode() {
        assert_eq!(startup_names(&s(&["all"]), false), s(&["context", "all"]));
    }
}
