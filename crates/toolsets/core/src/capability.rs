//! Capability pairs threaded through toolsets: tools and resource templates.
//!
//! The toolset layer never inspects a capability beyond its name and
//! description. [`ServerTool`] and [`ResourceTemplate`] bundle a descriptor
//! with a type-erased handler so they can be cloned into a host server.

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::fmt::{TextFormat, TextOptions};
use crate::schema::{SchemaEngine, input_schema_for};
use crate::tool::{Tool, ToolCodec};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Result of a tool call: JSON data plus its text rendering.
#[derive(Debug, Clone)]
pub struct FormattedResult {
    /// The JSON-serialized output data.
    pub data: Value,
    /// Text representation. None means the caller should fall back to the JSON.
    pub text: Option<String>,
}

impl FormattedResult {
    /// A plain text result.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            data: Value::String(text.clone()),
            text: Some(text),
        }
    }
}

/// Type-erased tool handler.
pub trait ToolHandler: Send + Sync {
    /// Call the tool with JSON arguments.
    fn call(
        &self,
        args: Value,
        ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<FormattedResult, ToolError>>;
}

impl<F> ToolHandler for F
where
    F: Fn(Value, &ToolContext) -> BoxFuture<'static, Result<FormattedResult, ToolError>>
        + Send
        + Sync,
{
    fn call(
        &self,
        args: Value,
        ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<FormattedResult, ToolError>> {
        (self)(args, ctx)
    }
}

/// Protocol-facing description of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    description: String,
    input_schema: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    read_only_hint: Option<bool>,
}

impl ToolDescriptor {
    /// Create a descriptor accepting an empty object.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut input_schema = Map::new();
        input_schema.insert("type".into(), Value::String("object".into()));
        input_schema.insert("properties".into(), Value::Object(Map::new()));
        Self {
            name: name.into(),
            title: None,
            description: description.into(),
            input_schema,
            read_only_hint: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Tell clients whether the tool leaves its environment untouched.
    pub fn with_read_only_hint(mut self, read_only: bool) -> Self {
        self.read_only_hint = Some(read_only);
        self
    }

    /// Replace the input schema.
    pub fn with_input_schema(mut self, input_schema: Map<String, Value>) -> Self {
        self.input_schema = input_schema;
        self
    }

    /// Tool name; the identifier used for registration and dispatch.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn read_only_hint(&self) -> Option<bool> {
        self.read_only_hint
    }

    /// JSON Schema of the arguments object.
    pub fn input_schema(&self) -> &Map<String, Value> {
        &self.input_schema
    }
}

/// A `(descriptor, handler)` pair.
#[derive(Clone)]
pub struct ServerTool {
    descriptor: Arc<ToolDescriptor>,
    handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for ServerTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerTool")
            .field("name", &self.descriptor.name)
            .finish_non_exhaustive()
    }
}

impl ServerTool {
    /// Pair an opaque descriptor with a handler.
    pub fn new<H>(descriptor: ToolDescriptor, handler: H) -> Self
    where
        H: ToolHandler + 'static,
    {
        Self {
            descriptor: Arc::new(descriptor),
            handler: Arc::new(handler),
        }
    }

    /// Build a server tool from a native [`Tool`] and its codec.
    ///
    /// Use `()` as the codec when the tool's Input/Output types already
    /// implement serde and schemars traits.
    pub fn from_tool<T, C>(tool: T) -> Self
    where
        T: Tool,
        C: ToolCodec<T>,
        C::WireOut: TextFormat,
    {
        Self::from_tool_with_schema::<T, C>(tool, &SchemaEngine::default())
    }

    /// Like [`ServerTool::from_tool`], applying runtime schema constraints.
    pub fn from_tool_with_schema<T, C>(tool: T, engine: &SchemaEngine) -> Self
    where
        T: Tool,
        C: ToolCodec<T>,
        C::WireOut: TextFormat,
    {
        struct Adapter<T: Tool, C: ToolCodec<T>> {
            tool: T,
            _codec: PhantomData<C>,
        }

        impl<T, C> ToolHandler for Adapter<T, C>
        where
            T: Tool,
            C: ToolCodec<T>,
            C::WireOut: TextFormat,
        {
            fn call(
                &self,
                args: Value,
                ctx: &ToolContext,
            ) -> BoxFuture<'static, Result<FormattedResult, ToolError>> {
                // MCP clients may omit arguments entirely for no-input tools
                let args = if args.is_null() {
                    Value::Object(Map::new())
                } else {
                    args
                };
                let native_in = serde_json::from_value::<C::WireIn>(args)
                    .map_err(|e| ToolError::invalid_input(e.to_string()))
                    .and_then(C::decode);

                match native_in {
                    Err(e) => Box::pin(async move { Err(e) }),
                    Ok(native_in) => {
                        let fut = self.tool.call(native_in, ctx);
                        Box::pin(async move {
                            let wired = C::encode(fut.await?)?;
                            let text = wired.fmt_text(&TextOptions::default());
                            let data = serde_json::to_value(&wired)
                                .map_err(|e| ToolError::internal(e.to_string()))?;
                            Ok(FormattedResult {
                                data,
                                text: Some(text),
                            })
                        })
                    }
                }
            }
        }

        let schema = engine.transform(
            T::NAME,
            input_schema_for::<C::WireIn>().as_ref().clone(),
        );
        let input_schema = match serde_json::to_value(&schema) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let mut descriptor = ToolDescriptor::new(T::NAME, T::DESCRIPTION)
            .with_input_schema(input_schema)
            .with_read_only_hint(T::READ_ONLY);
        if let Some(title) = T::TITLE {
            descriptor = descriptor.with_title(title);
        }

        Self::new(
            descriptor,
            Adapter::<T, C> {
                tool,
                _codec: PhantomData,
            },
        )
    }

    /// The tool's identifier.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// The tool's description.
    pub fn description(&self) -> &str {
        self.descriptor.description()
    }

    /// The full descriptor.
    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Invoke the handler.
    pub fn call(
        &self,
        args: Value,
        ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<FormattedResult, ToolError>> {
        self.handler.call(args, ctx)
    }
}

// ============================================================================
// Resource templates
// ============================================================================

/// Protocol-facing description of a parameterized resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplateDescriptor {
    uri_template: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
}

impl ResourceTemplateDescriptor {
    /// Create a descriptor from an RFC 6570 style template and a name.
    pub fn new(uri_template: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri_template: uri_template.into(),
            name: name.into(),
            description: None,
            mime_type: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the MIME type of the produced contents.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The URI template; the identifier used for registration.
    pub fn uri_template(&self) -> &str {
        &self.uri_template
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Optional MIME type.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Match a concrete URI against the template, returning the bound variables.
    ///
    /// Supports `{var}` (one path segment), `{+var}` (any text) and
    /// `{/var*}` (zero or more trailing segments).
    pub fn match_uri(&self, uri: &str) -> Option<HashMap<String, String>> {
        let parts = parse_template(&self.uri_template)?;
        let mut vars = HashMap::new();
        match_parts(&parts, uri, &mut vars).then_some(vars)
    }
}

/// Contents returned by a resource read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceContents {
    /// UTF-8 text contents.
    #[serde(rename_all = "camelCase")]
    Text {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        text: String,
    },
    /// Base64 encoded binary contents.
    #[serde(rename_all = "camelCase")]
    Blob {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        blob: String,
    },
}

impl ResourceContents {
    /// Text contents for `uri`.
    pub fn text(uri: impl Into<String>, text: impl Into<String>) -> Self {
        ResourceContents::Text {
            uri: uri.into(),
            mime_type: None,
            text: text.into(),
        }
    }
}

/// Type-erased resource template handler.
pub trait ResourceHandler: Send + Sync {
    /// Read the resource at `uri`, with the template variables already bound.
    fn read(
        &self,
        uri: &str,
        vars: &HashMap<String, String>,
        ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<Vec<ResourceContents>, ToolError>>;
}

impl<F> ResourceHandler for F
where
    F: Fn(
            &str,
            &HashMap<String, String>,
            &ToolContext,
        ) -> BoxFuture<'static, Result<Vec<ResourceContents>, ToolError>>
        + Send
        + Sync,
{
    fn read(
        &self,
        uri: &str,
        vars: &HashMap<String, String>,
        ctx: &ToolContext,
    ) -> BoxFuture<'static, Result<Vec<ResourceContents>, ToolError>> {
        (self)(uri, vars, ctx)
    }
}

/// A `(template descriptor, handler)` pair.
#[derive(Clone)]
pub struct ResourceTemplate {
    descriptor: Arc<ResourceTemplateDescriptor>,
    handler: Arc<dyn ResourceHandler>,
}

impl std::fmt::Debug for ResourceTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTemplate")
            .field("uri_template", &self.descriptor.uri_template)
            .finish_non_exhaustive()
    }
}

impl ResourceTemplate {
    /// Pair a template descriptor with its handler.
    pub fn new<H>(descriptor: ResourceTemplateDescriptor, handler: H) -> Self
    where
        H: ResourceHandler + 'static,
    {
        Self {
            descriptor: Arc::new(descriptor),
            handler: Arc::new(handler),
        }
    }

    /// The template descriptor.
    pub fn descriptor(&self) -> &ResourceTemplateDescriptor {
        &self.descriptor
    }

    /// The URI template.
    pub fn uri_template(&self) -> &str {
        self.descriptor.uri_template()
    }

    /// Read `uri` if it matches this template, `None` otherwise.
    pub fn read(
        &self,
        uri: &str,
        ctx: &ToolContext,
    ) -> Option<BoxFuture<'static, Result<Vec<ResourceContents>, ToolError>>> {
        let vars = self.descriptor.match_uri(uri)?;
        Some(self.handler.read(uri, &vars, ctx))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Part {
    Literal(String),
    Segment(String),
    Reserved(String),
    PathExplode(String),
}

fn parse_template(template: &str) -> Option<Vec<Part>> {
    let mut parts = vec![];
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        if open > 0 {
            parts.push(Part::Literal(rest[..open].to_string()));
        }
        let close = rest[open..].find('}')? + open;
        let expr = &rest[open + 1..close];
        let part = if let Some(name) = expr.strip_prefix('/').and_then(|e| e.strip_suffix('*')) {
            Part::PathExplode(name.to_string())
        } else if let Some(name) = expr.strip_prefix('+') {
            Part::Reserved(name.to_string())
        } else {
            Part::Segment(expr.to_string())
        };
        parts.push(part);
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        parts.push(Part::Literal(rest.to_string()));
    }
    Some(parts)
}

fn match_parts(parts: &[Part], s: &str, vars: &mut HashMap<String, String>) -> bool {
    let mut matcher = UriMatcher::new(parts, s);
    if !matcher.matches(0, 0) {
        return false;
    }
    // Replay the first successful choice at each step; each lookup is memoized
    let (mut i, mut at) = (0, 0);
    while i < parts.len() {
        let Some((capture, next)) = matcher
            .steps(i, at)
            .into_iter()
            .find(|(_, next)| matcher.matches(i + 1, *next))
        else {
            return false;
        };
        if let (Some(range), Some(name)) = (capture, parts[i].var_name()) {
            vars.insert(name.to_string(), s[range].to_string());
        }
        i += 1;
        at = next;
    }
    true
}

impl Part {
    fn var_name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Segment(n) | Self::Reserved(n) | Self::PathExplode(n) => Some(n),
        }
    }
}

type Step = (Option<std::ops::Range<usize>>, usize);

/// Matches a parsed template against a URI with one memo cell per
/// (part, offset), so the work is bounded by parts x offsets x offsets.
struct UriMatcher<'a> {
    parts: &'a [Part],
    s: &'a str,
    memo: Vec<Option<bool>>,
}

impl<'a> UriMatcher<'a> {
    fn new(parts: &'a [Part], s: &'a str) -> Self {
        Self {
            parts,
            s,
            memo: vec![None; (parts.len() + 1) * (s.len() + 1)],
        }
    }

    /// Whether `parts[i..]` matches `s[at..]`.
    fn matches(&mut self, i: usize, at: usize) -> bool {
        if i == self.parts.len() {
            return at == self.s.len();
        }
        let cell = i * (self.s.len() + 1) + at;
        if let Some(hit) = self.memo[cell] {
            return hit;
        }
        let hit = self
            .steps(i, at)
            .into_iter()
            .any(|(_, next)| self.matches(i + 1, next));
        self.memo[cell] = Some(hit);
        hit
    }

    /// Ways part `i` can consume input at `at`, longest capture first.
    fn steps(&self, i: usize, at: usize) -> Vec<Step> {
        let rest = &self.s[at..];
        let captures = |from: usize, limit: usize, allow_empty: bool| -> Vec<Step> {
            (from..=limit)
                .rev()
                .filter(|e| self.s.is_char_boundary(*e) && (allow_empty || *e > from))
                .map(|e| (Some(from..e), e))
                .collect()
        };
        match &self.parts[i] {
            Part::Literal(lit) => {
                if rest.starts_with(lit.as_str()) {
                    vec![(None, at + lit.len())]
                } else {
                    vec![]
                }
            }
            Part::Segment(_) => {
                let limit = rest.find('/').map_or(self.s.len(), |p| at + p);
                captures(at, limit, false)
            }
            Part::Reserved(_) => captures(at, self.s.len(), true),
            Part::PathExplode(_) => {
                let mut steps = if rest.starts_with('/') {
                    captures(at + 1, self.s.len(), false)
                } else {
                    vec![]
                };
                steps.push((None, at));
                steps
            }
        }
    }
}
