//! Typed tool definitions.
//!
//! Toolsets store type-erased [`ServerTool`](crate::ServerTool)s. Most tools
//! are written against [`Tool`] with plain Rust input and output types and
//! erased with [`ServerTool::from_tool`](crate::ServerTool::from_tool), which
//! copies the tool's name, title and read-only hint into its descriptor.

use crate::context::ToolContext;
use crate::error::ToolError;
use futures::future::BoxFuture;

/// A capability with typed input and output.
///
/// ```ignore
/// use futures::future::BoxFuture;
/// use toolsets_core::{Tool, ToolContext, ToolError};
///
/// struct GetRepository;
///
/// impl Tool for GetRepository {
///     type Input = RepoRef;
///     type Output = Repository;
///     const NAME: &'static str = "get_repository";
///     const DESCRIPTION: &'static str = "Fetch a repository by owner and name";
///     const TITLE: Option<&'static str> = Some("Get repository");
///     const READ_ONLY: bool = true;
///
///     fn call(&self, input: RepoRef, _ctx: &ToolContext)
///         -> BoxFuture<'static, Result<Repository, ToolError>>
///     {
///         Box::pin(async move { lookup(&input.owner, &input.repo).await })
///     }
/// }
/// ```
pub trait Tool: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Identifier the tool is registered under. Unique within a host.
    const NAME: &'static str;

    const DESCRIPTION: &'static str;

    /// Display title advertised to clients. Defaults to the name.
    const TITLE: Option<&'static str> = None;

    /// Advertised as the read-only hint.
    ///
    /// Only a hint for clients: whether a toolset serves the tool in
    /// read-only mode depends on whether it was added as a read or write tool.
    const READ_ONLY: bool = false;

    fn call(
        &self,
        input: Self::Input,
        ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<Self::Output, ToolError>>;
}

/// JSON boundary of a [`Tool`].
///
/// `WireIn` is what clients send and also drives the advertised input schema.
/// `()` passes serde-capable types straight through.
pub trait ToolCodec<T: Tool>: Send + Sync + 'static {
    type WireIn: serde::de::DeserializeOwned + schemars::JsonSchema + Send + 'static;
    type WireOut: serde::Serialize + Send + 'static;

    fn decode(wire: Self::WireIn) -> Result<T::Input, ToolError>;

    fn encode(native: T::Output) -> Result<Self::WireOut, ToolError>;
}

impl<T> ToolCodec<T> for ()
where
    T: Tool,
    T::Input: serde::de::DeserializeOwned + schemars::JsonSchema,
    T::Output: serde::Serialize,
{
    type WireIn = T::Input;
    type WireOut = T::Output;

    fn decode(wire: Self::WireIn) -> Result<T::Input, ToolError> {
        Ok(wire)
    }

    fn encode(native: T::Output) -> Result<Self::WireOut, ToolError> {
        Ok(native)
    }
}
