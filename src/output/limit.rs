//! Display-side limit on very long agent answers.
//!
//! Applied by the presentation layer only; the [`crate::result::InvocationResult`]
//! always keeps the full content.

use regex::Regex;
use std::sync::LazyLock;

/// Content longer than this (in characters) is summarized or truncated.
pub const MAX_RESPONSE_CHARS: usize = 50_000;

/// Size of the excerpt shown when no summary block exists.
const EXCERPT_CHARS: usize = 4_000;

static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<SUMMARY>(.*?)</SUMMARY>").expect("valid summary regex"));

/// Content prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitedOutput {
    /// Content fits; shown as is.
    Full(String),
    /// Replaced by the agent's own `<SUMMARY>` block.
    Summarized { text: String, original_chars: usize },
    /// Replaced by a leading excerpt and a notice.
    Truncated { text: String, original_chars: usize },
}

impl LimitedOutput {
    pub fn text(&self) -> &str {
        match self {
            LimitedOutput::Full(text)
            | LimitedOutput::Summarized { text, .. }
            | LimitedOutput::Truncated { text, .. } => text,
        }
    }
}

/// Limit content to [`MAX_RESPONSE_CHARS`] for display.
pub fn apply_output_limit(content: &str) -> LimitedOutput {
    let original_chars = content.chars().count();
    if original_chars <= MAX_RESPONSE_CHARS {
        return LimitedOutput::Full(content.to_string());
    }

    if let Some(summary) = SUMMARY_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
    {
        return LimitedOutput::Summarized {
            text: summary.to_string(),
            original_chars,
        };
    }

    let excerpt: String = content.chars().take(EXCERPT_CHARS).collect();
    LimitedOutput::Truncated {
        text: format!(
            "Output was {} characters, exceeding limit. Showing excerpt:\n\n{}\n\n... (truncated)",
            original_chars, excerpt
        ),
        original_chars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_untouched() {
        let out = apply_output_limit("short answer");
        assert_eq!(out, LimitedOutput::Full("short answer".to_string()));
    }

    #[test]
    fn long_content_prefers_summary_block() {
        let body = "x".repeat(MAX_RESPONSE_CHARS + 1);
        let content = format!("{body}\n<summary>\n  the gist\n</summary>");
        match apply_output_limit(&content) {
            LimitedOutput::Summarized {
                text,
                original_chars,
            } => {
                assert_eq!(text, "the gist");
                assert_eq!(original_chars, content.chars().count());
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn long_content_without_summary_is_truncated() {
        let content = "é".repeat(MAX_RESPONSE_CHARS + 10);
        let out = apply_output_limit(&content);
        match &out {
            LimitedOutput::Truncated { original_chars, .. } => {
                assert_eq!(*original_chars, MAX_RESPONSE_CHARS + 10);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        assert!(out.text().starts_with("Output was 50010 characters"));
        assert!(out.text().ends_with("... (truncated)"));
        assert!(out.text().contains(&"é".repeat(EXCERPT_CHARS)));
    }

    #[test]
    fn empty_summary_falls_back_to_truncation() {
        let content = format!("{}<SUMMARY>   </SUMMARY>", "y".repeat(MAX_RESPONSE_CHARS));
        assert!(matches!(
            apply_output_limit(&content),
            LimitedOutput::Truncated { .. }
        ));
    }
}
