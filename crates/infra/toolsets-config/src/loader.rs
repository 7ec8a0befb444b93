//! Configuration loader with two-layer merge and env overrides.
//!
//! The loading process:
//! 1. Read global config from `~/.config/toolsets/toolsets.json`
//! 2. Read local config from `./toolsets.json` (or an explicit file)
//! 3. Deep merge at JSON Value level (RFC 7396)
//! 4. Deserialize once into typed [`ToolsetsConfig`]
//! 5. Apply env var overrides (highest precedence)
//! 6. Run advisory validation

use crate::{merge::merge_patch, types::ToolsetsConfig, validation::AdvisoryWarning};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Filename for local config.
pub const LOCAL_FILE: &str = "toolsets.json";

/// Directory name under config_dir for global config.
pub const GLOBAL_DIR: &str = "toolsets";

/// Filename for global config.
pub const GLOBAL_FILE: &str = "toolsets.json";

/// Resolved paths for config files.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Path to local config.
    pub local: PathBuf,

    /// Path to global config.
    pub global: PathBuf,
}

impl ConfigPaths {
    /// Default locations: the global file plus `toolsets.json` in `local_dir`.
    pub fn discover(local_dir: &Path) -> Result<Self> {
        Ok(Self {
            local: local_config_path(local_dir),
            global: global_config_path()?,
        })
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct LoadedToolsetsConfig {
    /// The loaded and merged configuration.
    pub config: ToolsetsConfig,

    /// Advisory warnings from validation.
    pub warnings: Vec<AdvisoryWarning>,

    /// Config file paths that were consulted.
    pub paths: ConfigPaths,
}

/// Get the global config file path.
///
/// Returns `~/.config/toolsets/toolsets.json` on Linux.
pub fn global_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config dir")?;
    Ok(base.join(GLOBAL_DIR).join(GLOBAL_FILE))
}

/// Get the local config file path for a given directory.
pub fn local_config_path(local_dir: &Path) -> PathBuf {
    local_dir.join(LOCAL_FILE)
}

/// Load and merge configuration from the default global and local files.
pub fn load_merged(local_dir: &Path) -> Result<LoadedToolsetsConfig> {
    load_from(ConfigPaths::discover(local_dir)?)
}

/// Load and merge configuration from explicit paths. Missing files count as empty.
pub fn load_from(paths: ConfigPaths) -> Result<LoadedToolsetsConfig> {
    let config = load_layers(&paths)?;
    let warnings = crate::validation::validate(&config);
    Ok(LoadedToolsetsConfig {
        config,
        warnings,
        paths,
    })
}

/// Merge the file layers and apply env overrides, without validating.
///
/// For callers that layer more overrides on top (such as command-line flags)
/// and validate the final result themselves.
pub fn load_layers(paths: &ConfigPaths) -> Result<ToolsetsConfig> {
    let global_v = read_json_object_or_empty(&paths.global)?;
    let local_v = read_json_object_or_empty(&paths.local)?;

    let merged = merge_patch(global_v, local_v);

    let mut cfg: ToolsetsConfig =
        serde_json::from_value(merged).context("Failed to deserialize merged toolsets config")?;

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply environment variable overrides to the config.
fn apply_env_overrides(cfg: &mut ToolsetsConfig) {
    if let Some(v) = env_trimmed("TOOLSETS_ENABLED") {
        cfg.toolsets = split_list(&v);
    }
    if let Some(v) = env_trimmed("TOOLSETS_READ_ONLY") {
        cfg.read_only = parse_flag(&v);
    }
    if let Some(v) = env_trimmed("TOOLSETS_DYNAMIC") {
        cfg.dynamic_toolsets = parse_flag(&v);
    }
    if let Some(v) = env_trimmed("TOOLSETS_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = env_trimmed("TOOLSETS_LOG_JSON") {
        cfg.logging.json = parse_flag(&v);
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(v: &str) -> bool {
    v.eq_ignore_ascii_case("true") || v == "1"
}

/// Helper to read and normalize an env var (trim + filter empty).
fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a JSON file as a Value, returning empty object if file doesn't exist.
fn read_json_object_or_empty(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let v: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    match v {
        Value::Object(_) => Ok(v),
        _ => anyhow::bail!("Config root must be a JSON object: {}", path.display()),
    }
}
