//! Error types for clink.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//!
//! These errors cover everything that can go wrong *before* an agent process
//! is launched: bad configuration, unknown agents or roles, missing prompts.
//! Once a process has been started, every outcome is reported through
//! [`crate::result::InvocationResult`] instead.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for clink operations.
#[derive(Error, Debug)]
pub enum ClinkError {
    /// User provided invalid arguments.
    #[error("{0}")]
    UserError(String),

    /// A configuration file could not be read, parsed or validated.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The requested agent is not present in the registry.
    #[error("agent '{name}' is not configured. Available agents: {available}")]
    UnknownAgent { name: String, available: String },

    /// The requested role is not declared by the agent.
    #[error("role '{role}' is not configured for agent '{agent}'. Available roles: {available}")]
    UnknownRole {
        agent: String,
        role: String,
        available: String,
    },

    /// Neither the requested role nor the default role has a system prompt.
    #[error(
        "no system prompt found for agent '{agent}' (role '{role}', including the default role)\n\
         Fix: add a `prompt` to the role in agents.yaml or create {hint}"
    )]
    MissingPrompt {
        agent: String,
        role: String,
        hint: String,
    },

    /// A request was paired with a descriptor resolved for another agent.
    #[error("request targets agent '{requested}' but the descriptor was resolved for '{resolved}'")]
    DescriptorMismatch { requested: String, resolved: String },
}

impl ClinkError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClinkError::UserError(_) => exit_codes::USER_ERROR,
            ClinkError::ConfigError(_)
            | ClinkError::UnknownAgent { .. }
            | ClinkError::UnknownRole { .. }
            | ClinkError::MissingPrompt { .. }
            | ClinkError::DescriptorMismatch { .. } => exit_codes::CONFIG_ERROR,
        }
    }
}

/// Result type alias for clink operations.
pub type Result<T> = std::result::Result<T, ClinkError>;
