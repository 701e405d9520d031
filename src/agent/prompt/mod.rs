//! Prompt handling for agent invocations.
//!
//! This module provides:
//!
//! - **Template**: Placeholder substitution for argument templates
//! - **Store**: System-prompt lookup per (agent, role), with default-role fallback
//! - **Compose**: Assembly of the prompt text actually delivered to the agent
//!
//! # Template Syntax
//!
//! Argument fragments use `{variable}` placeholders:
//!
//! ```text
//! --append-system-prompt
//! {system_prompt}
//! --role={role}
//! {prompt}
//! ```
//!
//! Use `{{` to escape and render a literal `{`.

mod compose;
mod store;
mod template;

pub use compose::{FileReference, compose_prompt};
pub use store::{PromptLibrary, PromptLookup, PromptStore};
pub use template::{
    TemplateError, check_placeholders, mentions_placeholder, render_template, vars,
};
