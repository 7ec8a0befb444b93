//! Advisory validation for [`ToolsetsConfig`].
//!
//! Validation only produces warnings. Unknown toolset names are not checked
//! here: the set of toolsets is only known once the server builds its group,
//! and an unknown name fails startup there.

use crate::types::ToolsetsConfig;
use std::collections::HashSet;

/// An advisory warning about a configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryWarning {
    /// Machine-readable warning code.
    pub code: &'static str,

    /// Human-readable warning message.
    pub message: String,

    /// JSON path to the problematic config field.
    pub path: &'static str,
}

impl std::fmt::Display for AdvisoryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a configuration and return advisory warnings.
pub fn validate(cfg: &ToolsetsConfig) -> Vec<AdvisoryWarning> {
    let mut warnings = vec![];

    let mut seen = HashSet::new();
    for name in &cfg.toolsets {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            warnings.push(AdvisoryWarning {
                code: "toolsets.name.empty",
                path: "toolsets",
                message: "Empty toolset name is ignored".into(),
            });
        } else if !seen.insert(trimmed) {
            warnings.push(AdvisoryWarning {
                code: "toolsets.name.duplicate",
                path: "toolsets",
                message: format!("Toolset '{trimmed}' is listed more than once"),
            });
        }
    }

    if seen.contains("all") && seen.len() > 1 {
        warnings.push(AdvisoryWarning {
            code: "toolsets.all.combined",
            path: "toolsets",
            message: "'all' already enables every toolset; other names are redundant".into(),
        });
    }

    if seen.contains("all") && cfg.dynamic_toolsets {
        warnings.push(AdvisoryWarning {
            code: "toolsets.all.dynamic",
            path: "toolsets",
            message: "'all' is ignored when dynamic_toolsets is on".into(),
        });
    }

    if seen.contains("dynamic") && !cfg.dynamic_toolsets {
        warnings.push(AdvisoryWarning {
            code: "toolsets.dynamic.disabled",
            path: "dynamic_toolsets",
            message: "'dynamic' is listed but dynamic_toolsets is off; the discovery tools will be exposed alongside every enabled toolset".into(),
        });
    }

    if !VALID_LEVELS.contains(&cfg.logging.level.to_lowercase().as_str()) {
        warnings.push(AdvisoryWarning {
            code: "logging.level.invalid",
            path: "logging.level",
            message: format!(
                "Unknown log level '{}'. Expected one of: {}",
                cfg.logging.level,
                VALID_LEVELS.join(", ")
            ),
        });
    }

    if cfg.server.name.trim().is_empty() {
        warnings.push(AdvisoryWarning {
            code: "server.name.empty",
            path: "server.name",
            message: "Value cannot be empty".into(),
        });
    }

    warnings
}
