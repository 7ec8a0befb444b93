//! Per-call context.

/// Context passed to tool and resource handlers, one per request.
#[derive(Clone, Default, Debug)]
#[non_exhaustive]
pub struct ToolContext {}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }
}
