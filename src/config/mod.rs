//! Agent registry for clink.
//!
//! This module defines the `agents.yaml` model, the built-in profiles, and
//! the layered discovery that merges them. It supports forward-compatible
//! YAML parsing (unknown fields are preserved) and validates every profile
//! before anything is launched.

mod builtin;
mod discovery;
mod model;
mod operations;


// Re-export public API
pub use builtin::DEFAULT_SYSTEM_PROMPT;
pub use discovery::{CONFIG_ENV_VAR, ConfigSources, PROJECT_CONFIG_FILE};
pub use model::{
    AgentDefaults, AgentProfile, AgentsConfig, DEFAULT_ROLE, DEFAULT_TIMEOUT_SECONDS,
    OutputFileConfig, RoleProfile,
};
pub(crate) use operations::expand_home;
