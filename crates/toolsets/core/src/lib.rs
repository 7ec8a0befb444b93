//! Core types for the toolsets library family.
//!
//! This crate provides:
//! - [`Tool`] trait: Native-first tool definition with no serde bounds
//! - [`ToolCodec`] trait: Serialization boundary for protocol integration
//! - [`ServerTool`]: The `(descriptor, handler)` pair threaded through toolsets
//! - [`HostServer`]: The registration seam a live server exposes, with
//!   [`LiveCapabilities`] as the in-memory implementation
//! - [`Toolset`] / [`ToolsetGroup`]: Enablement and read-only policy
//! - [`dynamic`]: Tools that let a client discover and enable toolsets mid-session

pub mod capability;
pub mod context;
pub mod dynamic;
pub mod error;
pub mod fmt;
pub mod group;
pub mod host;
pub mod schema;
pub mod tool;
pub mod toolset;

pub use capability::{
    FormattedResult, ResourceContents, ResourceHandler, ResourceTemplate,
    ResourceTemplateDescriptor, ServerTool, ToolDescriptor, ToolHandler,
};
pub use context::ToolContext;
pub use dynamic::{DYNAMIC_TOOLSET, dynamic_toolset};
pub use error::{ToolError, ToolsetError};
pub use fmt::{TextFormat, TextOptions, TextStyle, fallback_text_from_json};
pub use group::{ALL_TOOLSETS, EnableOutcome, SharedToolsetGroup, ToolsetGroup, WeakToolsetGroup};
pub use host::{HostServer, LiveCapabilities};
pub use schema::{FieldConstraint, SchemaEngine, input_schema_for};
pub use tool::{Tool, ToolCodec};
pub use toolset::{Toolset, ToolsetBuilder};

// Re-export BoxFuture so tool implementors don't need a direct futures dependency
pub use futures::future::BoxFuture;
