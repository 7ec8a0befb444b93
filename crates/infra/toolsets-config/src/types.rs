//! Configuration types for the toolsets server.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Root configuration, loaded from `toolsets.json` files.
///
/// All fields use `#[serde(default)]` so partial configs work correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ToolsetsConfig {
    /// Optional JSON Schema URL for IDE autocomplete support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Toolsets to enable at startup. `"all"` enables every toolset.
    pub toolsets: Vec<String>,

    /// Expose only read tools.
    pub read_only: bool,

    /// Start with the discovery tools only and let the client enable toolsets.
    pub dynamic_toolsets: bool,

    /// Logging and diagnostics configuration.
    pub logging: LoggingConfig,

    /// Server identity.
    pub server: ServerConfig,
}

impl Default for ToolsetsConfig {
    fn default() -> Self {
        Self {
            schema: None,
            toolsets: vec!["all".into()],
            read_only: false,
            dynamic_toolsets: false,
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Logging configuration. Logs always go to stderr.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

/// What the server reports about itself on `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "toolsets-server".into(),
        }
    }
}
