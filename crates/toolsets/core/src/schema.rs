//! Tool input schemas: generation from Rust types plus runtime patches.
//!
//! Schemas are derived with schemars. Facts only known once the server is
//! assembled, such as which toolset names exist, are patched in per tool by a
//! [`SchemaEngine`].

use schemars::generate::SchemaSettings;
use schemars::transform::AddNullable;
use schemars::{JsonSchema, Schema};
use serde_json::Value;
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// A patch applied to one node of a tool's input schema.
#[derive(Clone, Debug)]
pub enum FieldConstraint {
    /// Set the node's `enum` to exactly these values.
    Enum(Vec<Value>),

    /// RFC 7396 merge patch onto the node. `null` removes a key.
    MergePatch(Value),
}

#[derive(Clone, Debug)]
struct Rule {
    path: Vec<String>,
    constraint: FieldConstraint,
}

/// Per-tool schema patches, applied when a tool is turned into a
/// [`ServerTool`](crate::ServerTool).
#[derive(Clone, Debug, Default)]
pub struct SchemaEngine {
    rules: HashMap<String, Vec<Rule>>,
    strict: bool,
}

impl SchemaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject unknown properties (`additionalProperties: false` on the root).
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Patch the node at `path` in `tool`'s schema. An empty path is the root.
    ///
    /// Rules apply in the order they were added. A path that does not exist in
    /// the generated schema is skipped.
    pub fn with_constraint(
        mut self,
        tool: &str,
        path: &[&str],
        constraint: FieldConstraint,
    ) -> Self {
        self.rules.entry(tool.to_string()).or_default().push(Rule {
            path: path.iter().map(|s| (*s).to_string()).collect(),
            constraint,
        });
        self
    }

    /// Apply every rule registered for `tool`.
    ///
    /// Falls back to the unpatched schema if the result is no longer an object.
    pub fn transform(&self, tool: &str, schema: Schema) -> Schema {
        let Ok(mut root) = serde_json::to_value(&schema) else {
            return schema;
        };
        if self.strict
            && let Some(obj) = root.as_object_mut()
        {
            obj.insert("additionalProperties".into(), Value::Bool(false));
        }
        for rule in self.rules.get(tool).into_iter().flatten() {
            if let Some(node) = node_at(&mut root, &rule.path) {
                apply(node, &rule.constraint);
            }
        }
        Schema::try_from(root).unwrap_or(schema)
    }
}

fn node_at<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter()
        .try_fold(root, |node, key| node.as_object_mut()?.get_mut(key))
}

fn apply(node: &mut Value, constraint: &FieldConstraint) {
    match constraint {
        FieldConstraint::Enum(values) => {
            if let Some(obj) = node.as_object_mut() {
                obj.insert("enum".into(), Value::Array(values.clone()));
            }
        }
        FieldConstraint::MergePatch(patch) => json_patch::merge(node, patch),
    }
}

thread_local! {
    static INPUT_SCHEMAS: RefCell<HashMap<TypeId, Arc<Schema>>> = RefCell::new(HashMap::new());
}

/// Draft 2020-12 input schema for `T`, with `Option` fields marked nullable.
///
/// Generated once per type and thread.
pub fn input_schema_for<T: JsonSchema + 'static>() -> Arc<Schema> {
    INPUT_SCHEMAS.with(|cache| {
        Arc::clone(
            cache
                .borrow_mut()
                .entry(TypeId::of::<T>())
                .or_insert_with(|| {
                    Arc::new(
                        SchemaSettings::draft2020_12()
                            .with_transform(AddNullable::default())
                            .into_generator()
                            .into_root_schema_for::<T>(),
                    )
                }),
        )
    })
}
