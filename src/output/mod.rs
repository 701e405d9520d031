//! Output normalization for captured agent output.
//!
//! External agents are not guaranteed to honor a structured-output request,
//! so structured parsing is best effort: a decode failure is reported as a
//! [`ParseError`] and the caller keeps the raw text. Freeform output is taken
//! verbatim, only trimmed at the edges.
//!
//! - **Text**: the whole output is the content, no metadata
//! - **Json**: a single JSON value (object or array), possibly after a
//!   non-JSON preamble
//! - **JsonLines**: one JSON event per line, as emitted by streaming CLIs

mod limit;
mod structured;

pub use limit::{LimitedOutput, MAX_RESPONSE_CHARS, apply_output_limit};

use crate::result::Metadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Shape of the output an agent is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Plain freeform text (default).
    #[default]
    Text,
    /// A single JSON payload.
    Json,
    /// Newline-delimited JSON events.
    JsonLines,
}

impl OutputFormat {
    /// Parse an output format from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "json_lines" | "json-lines" | "jsonl" => Some(Self::JsonLines),
            _ => None,
        }
    }

    /// Whether this format requires structured parsing.
    pub fn is_structured(self) -> bool {
        self != Self::Text
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonLines => write!(f, "json_lines"),
        }
    }
}

/// Content and metadata extracted from agent output.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOutput {
    pub content: String,
    pub metadata: Metadata,
}

/// Reasons structured output could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("output is empty while structured output was expected")]
    EmptyOutput,

    #[error("output does not contain a JSON payload")]
    NoPayload,

    #[error("failed to decode JSON output: {0}")]
    InvalidJson(String),

    #[error("structured output has no content field")]
    MissingContent,

    #[error("structured output has empty content")]
    EmptyContent,
}

/// Normalize raw output according to the requested format.
///
/// Deterministic: the same input and format always produce the same result.
pub fn normalize(raw: &str, format: OutputFormat) -> Result<NormalizedOutput, ParseError> {
    match format {
        OutputFormat::Text => Ok(NormalizedOutput {
            content: raw.trim().to_string(),
            metadata: Metadata::new(),
        }),
        OutputFormat::Json => structured::parse_json(raw),
        OutputFormat::JsonLines => structured::parse_json_lines(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_is_trimmed_but_otherwise_verbatim() {
        let raw = "\n\n  ```rust\nfn main() {}\n```\n\n  indented line\n \n";
        let out = normalize(raw, OutputFormat::Text).unwrap();
        assert_eq!(out.content, "```rust\nfn main() {}\n```\n\n  indented line");
        assert!(out.metadata.is_empty());
    }

    #[test]
    fn plain_hello_world() {
        let out = normalize("hello world\n", OutputFormat::Text).unwrap();
        assert_eq!(out.content, "hello world");
        assert!(out.metadata.is_empty());
    }

    #[test]
    fn text_format_never_fails_even_on_json() {
        let raw = r#"{"content": "hello"}"#;
        let out = normalize(raw, OutputFormat::Text).unwrap();
        assert_eq!(out.content, raw);
    }

    #[test]
    fn json_content_and_metadata() {
        let raw = r#"{"content": "hello", "metadata": {"model": "x"}}"#;
        let out = normalize(raw, OutputFormat::Json).unwrap();
        assert_eq!(out.content, "hello");
        assert_eq!(out.metadata.get("model"), Some(&json!("x")));
    }

    #[test]
    fn normalize_is_deterministic() {
        let raw = r#"{"result": "ok", "usage": {"input_tokens": 3}, "model": "m"}"#;
        let a = normalize(raw, OutputFormat::Json).unwrap();
        let b = normalize(raw, OutputFormat::Json).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn format_from_str() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(
            OutputFormat::from_str("json-lines"),
            Some(OutputFormat::JsonLines)
        );
        assert_eq!(OutputFormat::from_str("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn format_deserializes_from_yaml() {
        let format: OutputFormat = serde_yaml::from_str("json_lines").unwrap();
        assert_eq!(format, OutputFormat::JsonLines);
        assert_eq!(format.to_string(), "json_lines");
    }
}
