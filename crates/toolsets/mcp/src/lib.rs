//! MCP server integration for the toolsets library family.
//!
//! This crate provides [`ToolsetServer`], an rmcp-backed server handler that
//! serves whatever tools and resource templates are currently live in a
//! [`LiveCapabilities`](toolsets_core::LiveCapabilities) set.

mod server;

pub use server::ToolsetServer;

// Re-export rmcp types for convenience
pub use rmcp::transport::stdio;
pub use rmcp::{ServerHandler, service::ServiceExt};
