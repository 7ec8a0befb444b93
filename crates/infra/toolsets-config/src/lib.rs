//! Layered configuration for the toolsets server.
//!
//! This crate provides:
//! - [`ToolsetsConfig`]: The root configuration type
//! - [`load_merged`]: Two-layer config loading (global + local) with env overrides
//! - [`schema`]: JSON Schema generation for editor completion
//! - [`validation`]: Advisory validation that produces warnings
//!
//! # Configuration Precedence (lowest to highest)
//! 1. Default values
//! 2. Global config (`~/.config/toolsets/toolsets.json`)
//! 3. Local config (`./toolsets.json`, or the file passed with `--config`)
//! 4. Environment variables
//! 5. Command-line flags (applied by the binary)
//!
//! # Example
//! ```no_run
//! use toolsets_config::load_merged;
//! use std::path::Path;
//!
//! let loaded = load_merged(Path::new(".")).unwrap();
//! println!("Enabled toolsets: {:?}", loaded.config.toolsets);
//!
//! for warning in &loaded.warnings {
//!     eprintln!("Warning: {}", warning);
//! }
//! ```
//!
//! # Environment Variables
//! - `TOOLSETS_ENABLED`: Comma-separated toolset names
//! - `TOOLSETS_READ_ONLY`: Strip write tools ("true" or "1")
//! - `TOOLSETS_DYNAMIC`: Enable dynamic toolset discovery ("true" or "1")
//! - `TOOLSETS_LOG_LEVEL`: Override log level
//! - `TOOLSETS_LOG_JSON`: Enable JSON logging ("true" or "1")

pub mod loader;
pub mod merge;
pub mod schema;
pub mod types;
pub mod validation;

pub use loader::{ConfigPaths, LoadedToolsetsConfig, load_from, load_layers, load_merged};
pub use schema::schema_json_pretty;
pub use types::ToolsetsConfig;
