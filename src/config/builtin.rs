//! Built-in agent profiles for the common AI CLIs.
//!
//! These form the lowest configuration layer. Any file-based entry with the
//! same identifier replaces the built-in profile entirely.

use super::model::{AgentProfile, AgentsConfig, DEFAULT_ROLE, RoleProfile};
use crate::output::OutputFormat;
use std::collections::BTreeMap;

/// System prompt used by the built-in agents' default role.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert software engineer consulted by \
another engineer through the command line. Answer the request directly and concisely. \
When you propose code, show complete, working snippets. When the request is ambiguous, \
state your assumptions before answering.";

impl AgentsConfig {
    /// Registry containing only the built-in profiles.
    pub fn builtin() -> Self {
        let mut agents = BTreeMap::new();
        agents.insert("gemini".to_string(), gemini());
        agents.insert("codex".to_string(), codex());
        agents.insert("claude".to_string(), claude());
        Self {
            agents,
            ..Default::default()
        }
    }
}

fn default_roles() -> BTreeMap<String, RoleProfile> {
    let mut roles = BTreeMap::new();
    roles.insert(
        DEFAULT_ROLE.to_string(),
        RoleProfile {
            description: Some("General-purpose engineering assistant".to_string()),
            prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            ..Default::default()
        },
    );
    roles
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn gemini() -> AgentProfile {
    AgentProfile {
        name: "Gemini CLI".to_string(),
        command: "gemini".to_string(),
        args: args(&["--telemetry", "false", "--yolo", "-o", "json"]),
        output_format: OutputFormat::Json,
        roles: default_roles(),
        ..Default::default()
    }
}

fn codex() -> AgentProfile {
    AgentProfile {
        name: "Codex CLI".to_string(),
        command: "codex".to_string(),
        args: args(&[
            "exec",
            "--json",
            "--dangerously-bypass-approvals-and-sandbox",
            "--skip-git-repo-check",
        ]),
        output_format: OutputFormat::JsonLines,
        recover_on_error: true,
        roles: default_roles(),
        ..Default::default()
    }
}

fn claude() -> AgentProfile {
    AgentProfile {
        name: "Claude Code CLI".to_string(),
        command: "claude".to_string(),
        args: args(&[
            "--print",
            "--output-format",
            "json",
            "--permission-mode",
            "acceptEdits",
        ]),
        output_format: OutputFormat::Json,
        system_prompt_flag: Some("--append-system-prompt".to_string()),
        recover_on_error: true,
        roles: default_roles(),
        ..Default::default()
    }
}
