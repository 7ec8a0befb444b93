//! Transport-agnostic text formatting for tool outputs.
//!
//! MCP clients read the text content of a tool result, so every tool output
//! needs a text rendering. [`TextFormat`] provides one, defaulting to the JSON
//! serialization of the value:
//!
//! ```ignore
//! use toolsets_core::fmt::{TextFormat, TextOptions};
//!
//! #[derive(serde::Serialize)]
//! struct Listing {
//!     items: Vec<String>,
//! }
//!
//! // JSON text by default
//! impl TextFormat for Listing {}
//! ```

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Text rendering style for the default JSON formatting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextStyle {
    /// Single-line JSON, what machine clients parse most easily.
    #[default]
    Compact,
    /// Indented JSON for humans.
    Pretty,
}

/// Options controlling text formatting behavior.
#[derive(Clone, Debug, Default)]
pub struct TextOptions {
    /// The rendering style to use.
    pub style: TextStyle,
}

impl TextOptions {
    /// Create new text options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}

/// Text rendering of a tool output.
///
/// Override [`TextFormat::fmt_text`] for outputs whose natural form is a
/// sentence rather than a JSON document.
pub trait TextFormat: Serialize {
    /// Format the value as text.
    fn fmt_text(&self, opts: &TextOptions) -> String {
        match serde_json::to_value(self) {
            Ok(v) => json_text(&v, opts),
            Err(e) => format!("<unserializable output: {e}>"),
        }
    }
}

impl TextFormat for String {
    fn fmt_text(&self, _opts: &TextOptions) -> String {
        self.clone()
    }
}

impl TextFormat for JsonValue {}

/// Pretty JSON fallback used when a result carries data but no text.
///
/// This produces a nicely indented JSON string, or falls back to compact
/// JSON if pretty-printing fails.
pub fn fallback_text_from_json(v: &JsonValue) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

fn json_text(v: &JsonValue, opts: &TextOptions) -> String {
    match opts.style {
        TextStyle::Compact => v.to_string(),
        TextStyle::Pretty => fallback_text_from_json(v),
    }
}
