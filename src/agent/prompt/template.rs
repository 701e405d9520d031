//! Placeholder substitution for argument templates.
//!
//! # Syntax
//!
//! - `{name}` - Substitutes the value of variable `name`
//! - `{{` - Renders as literal `{`
//! - `}}` - Renders as literal `}`
//!
//! Undefined variables are an error rather than an empty substitution, so a
//! typo in `agents.yaml` fails at load time instead of launching an agent
//! with a silently missing argument. Substituted values are never re-scanned:
//! a user prompt containing braces is passed through untouched.

use std::collections::HashMap;
use thiserror::Error;

/// Error type for template rendering failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A variable was referenced but not provided.
    #[error("undefined variable '{name}' at position {position} in template")]
    UndefinedVariable { name: String, position: usize },

    /// A `{` was found without a matching `}`.
    #[error("unmatched '{{' at position {position} in template")]
    UnmatchedBrace { position: usize },

    /// An empty variable name was found (e.g., `{}`).
    #[error("empty variable name '{{}}' at position {position} in template")]
    EmptyVariableName { position: usize },
}

/// Render a template string by substituting variables.
///
/// # Examples
///
/// ```
/// use clink::agent::prompt::{render_template, vars};
///
/// let vars = vars([("prompt", "Explain {braces}"), ("role", "planner")]);
/// let result = render_template("--role={role} {prompt}", &vars).unwrap();
/// assert_eq!(result, "--role=planner Explain {braces}");
/// ```
///
/// Use `{{` to render a literal `{`:
///
/// ```
/// use std::collections::HashMap;
/// use clink::agent::prompt::render_template;
///
/// let result = render_template("--config={{\"a\":1}}", &HashMap::new()).unwrap();
/// assert_eq!(result, "--config={\"a\":1}");
/// ```
pub fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' => {
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    result.push('{');
                    continue;
                }

                let mut var_name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) => var_name.push(c),
                        None => return Err(TemplateError::UnmatchedBrace { position: pos }),
                    }
                }

                let var_name = var_name.trim();
                if var_name.is_empty() {
                    return Err(TemplateError::EmptyVariableName { position: pos });
                }

                match variables.get(var_name) {
                    Some(value) => result.push_str(value),
                    None => {
                        return Err(TemplateError::UndefinedVariable {
                            name: var_name.to_string(),
                            position: pos,
                        });
                    }
                }
            }
            '}' => {
                // `}}` collapses to one brace; a lone `}` is literal.
                if let Some((_, '}')) = chars.peek() {
                    chars.next();
                }
                result.push('}');
            }
            _ => result.push(ch),
        }
    }

    Ok(result)
}

/// Check that `template` only references placeholders from `allowed`.
pub fn check_placeholders(template: &str, allowed: &[&str]) -> Result<(), TemplateError> {
    let dummy = vars(allowed.iter().map(|name| (*name, "")));
    render_template(template, &dummy).map(|_| ())
}

/// Whether `template` references the placeholder `name`.
///
/// Escaped braces (`{{name}}`) do not count.
pub fn mentions_placeholder(template: &str, name: &str) -> bool {
    let mut chars = template.char_indices().peekable();
    while let Some((pos, ch)) = chars.next() {
        if ch != '{' {
            continue;
        }
        if let Some((_, '{')) = chars.peek() {
            chars.next();
            continue;
        }
        let Some(len) = template[pos + 1..].find('}') else {
            return false;
        };
        if template[pos + 1..pos + 1 + len].trim() == name {
            return true;
        }
    }
    false
}

/// Helper to create a variables map from a list of key-value pairs.
pub fn vars<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
