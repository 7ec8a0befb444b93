//! RFC 7396 JSON Merge Patch over config layers.

use serde_json::Value;

/// Apply `patch` on top of `target` with RFC 7396 semantics.
///
/// Objects merge recursively, `null` deletes a key, and arrays and scalars
/// replace. A `toolsets` list in the local file therefore replaces the global
/// list rather than extending it.
///
/// ```
/// use serde_json::json;
/// use toolsets_config::merge::merge_patch;
///
/// let global = json!({"toolsets": ["repos"], "logging": {"level": "debug"}});
/// let local = json!({"toolsets": ["issues"], "logging": {"json": true}});
/// assert_eq!(
///     merge_patch(global, local),
///     json!({"toolsets": ["issues"], "logging": {"level": "debug", "json": true}})
/// );
/// ```
pub fn merge_patch(mut target: Value, patch: Value) -> Value {
    json_patch::merge(&mut target, &patch);
    target
}
