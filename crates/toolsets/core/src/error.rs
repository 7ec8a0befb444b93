//! Error types for toolset management and tool execution.

use thiserror::Error;

/// Errors raised by [`ToolsetGroup`](crate::ToolsetGroup) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolsetError {
    /// The referenced toolset is not part of the group.
    #[error("Toolset {name} not found")]
    NotFound { name: String },

    /// The toolset name collides with a reserved sentinel.
    #[error("toolset name '{name}' is reserved")]
    ReservedName { name: String },
}

impl ToolsetError {
    /// Create a not found error.
    pub fn not_found<S: ToString>(name: S) -> Self {
        ToolsetError::NotFound {
            name: name.to_string(),
        }
    }
}

/// Error type returned by tool and resource handlers.
///
/// Every variant is reported to the client as an error-flagged result, never
/// as a protocol failure.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Invalid input provided to the tool.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required argument was absent.
    #[error("missing required parameter: {name}")]
    MissingParameter { name: String },

    /// Requested entity not found. The message is shown to the client verbatim.
    #[error("{0}")]
    NotFound(String),

    /// Internal error during tool execution.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create an invalid input error.
    pub fn invalid_input<S: ToString>(s: S) -> Self {
        ToolError::InvalidInput(s.to_string())
    }

    /// Create a missing parameter error.
    pub fn missing_parameter<S: ToString>(name: S) -> Self {
        ToolError::MissingParameter {
            name: name.to_string(),
        }
    }

    /// Create a not found error.
    pub fn not_found<S: ToString>(s: S) -> Self {
        ToolError::NotFound(s.to_string())
    }

    /// Create an internal error.
    pub fn internal<S: ToString>(s: S) -> Self {
        ToolError::Internal(s.to_string())
    }
}

impl From<ToolsetError> for ToolError {
    fn from(e: ToolsetError) -> Self {
        match e {
            ToolsetError::NotFound { .. } => ToolError::NotFound(e.to_string()),
            ToolsetError::ReservedName { .. } => ToolError::InvalidInput(e.to_string()),
        }
    }
}
