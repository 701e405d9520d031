//! Agent registry schema.
//!
//! # File Format
//!
//! ```yaml
//! defaults:
//!   timeout_seconds: 900
//!   prompts_dir: ./prompts
//!
//! agents:
//!   claude:
//!     name: "Claude Code CLI"
//!     command: claude
//!     args: ["--print", "--output-format", "json"]
//!     output_format: json
//!     system_prompt_flag: --append-system-prompt
//!     recover_on_error: true
//!     roles:
//!       planner:
//!         description: "Break work into steps"
//!         prompt_path: planner.txt
//!         args: ["--model", "opus"]
//!
//!   local-llm:
//!     command: "ollama run llama3"
//!     args: ["{system_prompt}\n\n{prompt}"]
//!     timeout_seconds: 120
//!     working_dir: ~/scratch
//!     environment:
//!       OLLAMA_NOHISTORY: "1"
//!     roles:
//!       default:
//!         prompt: "You are a concise assistant."
//! ```
//!
//! # Argument Placeholders
//!
//! - `{system_prompt}` - Resolved system prompt for the role
//! - `{prompt}` - User prompt (when absent, the prompt is sent on stdin)
//! - `{files}` - File references (a fragment that is exactly `{files}` expands
//!   to one argument per file)
//! - `{role}` - Role name
//!
//! Use `{{` and `}}` for literal braces.

use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Default timeout for agent execution in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 1800;

/// Name of the role used when none is requested.
pub const DEFAULT_ROLE: &str = "default";

/// Registry of agent profiles, loaded from `agents.yaml` and layered over
/// the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Agent profiles keyed by lowercase identifier.
    #[serde(default)]
    pub agents: BTreeMap<String, AgentProfile>,

    /// Default settings applied to all agents.
    #[serde(default)]
    pub defaults: AgentDefaults,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Default settings for agent execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDefaults {
    /// Default timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Directory holding `<agent>/<role>.txt` system prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Profile for a single external agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Human-readable name for the agent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Executable, optionally followed by leading arguments (`"npx gemini"`).
    /// Split with shell quoting rules, never run through a shell.
    pub command: String,

    /// Ordered argument template with placeholders.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Timeout in seconds (overrides default if set).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Directory to launch from; the caller's current directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Environment variables merged over the inherited environment.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,

    /// Output format the agent is configured to produce.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Flag used to pass the system prompt when `args` has no
    /// `{system_prompt}` slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_flag: Option<String>,

    /// Have the agent write its answer to a temporary file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<OutputFileConfig>,

    /// Treat a non-zero exit as success when structured output still parses.
    #[serde(default)]
    pub recover_on_error: bool,

    /// Roles keyed by name. `default` is always valid even when not listed.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub roles: BTreeMap<String, RoleProfile>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A named behavioral mode for an agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleProfile {
    /// Short description shown by `clink roles`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Inline system prompt text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// System prompt file; relative paths resolve against the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_path: Option<PathBuf>,

    /// Arguments appended after the agent's template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Output-to-file mode: the agent writes its answer to a path clink provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFileConfig {
    /// Flag template with a `{path}` placeholder, e.g. `--output {path}`.
    pub flag_template: String,

    /// Delete the file after reading it.
    #[serde(default = "default_cleanup")]
    pub cleanup: bool,
}

fn default_cleanup() -> bool {
    true
}

impl AgentProfile {
    /// Get the effective timeout for this agent, given the registry default.
    pub fn effective_timeout(&self, registry_default: Option<u64>) -> u64 {
        self.timeout_seconds
            .or(registry_default)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    /// Display name, falling back to the identifier.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        if self.name.is_empty() { id } else { &self.name }
    }

    /// Role names this agent accepts, always including `default`.
    pub fn role_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        if !self.roles.contains_key(DEFAULT_ROLE) {
            names.push(DEFAULT_ROLE);
            names.sort_unstable();
        }
        names
    }

    /// Whether `role` is in this agent's valid-role set.
    pub fn has_role(&self, role: &str) -> bool {
        role == DEFAULT_ROLE || self.roles.contains_key(role)
    }
}
