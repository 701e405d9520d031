//! System-prompt lookup.
//!
//! # Resolution Order
//!
//! For a given (agent, role):
//!
//! 1. The role's `prompt_path` file
//! 2. `<prompts_dir>/<agent>/<role>.txt`
//! 3. The role's inline `prompt`
//!
//! If the requested role yields nothing, the same lookup is repeated for the
//! `default` role and reported as a fallback. Empty or whitespace-only text
//! never counts as a prompt.

use crate::config::{AgentsConfig, DEFAULT_ROLE};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Outcome of a system-prompt lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptLookup {
    /// Prompt text for the requested role.
    Found(String),
    /// The requested role has no prompt; this is the default role's text.
    Fallback(String),
    /// Not even the default role has a prompt.
    NotFound,
}

/// Source of system prompts, read-only during an invocation.
pub trait PromptStore {
    /// Look up the system prompt for `role` of `agent`.
    fn resolve(&self, agent: &str, role: &str) -> PromptLookup;

    /// Where a default prompt for `agent` could be placed, for error hints.
    fn location_hint(&self, agent: &str) -> String {
        format!("a `default` role prompt for '{}'", agent)
    }
}

/// Prompt store backed by the agent registry and a prompts directory.
#[derive(Debug, Clone)]
pub struct PromptLibrary<'a> {
    config: &'a AgentsConfig,
    prompts_dir: Option<PathBuf>,
}

impl<'a> PromptLibrary<'a> {
    /// Library using the registry's `defaults.prompts_dir`.
    pub fn new(config: &'a AgentsConfig) -> Self {
        Self {
            config,
            prompts_dir: config.defaults.prompts_dir.clone(),
        }
    }

    /// Override the prompts directory.
    pub fn with_prompts_dir(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.prompts_dir = dir;
        }
        self
    }

    pub fn prompts_dir(&self) -> Option<&Path> {
        self.prompts_dir.as_deref()
    }

    fn role_prompt(&self, agent: &str, role: &str) -> Option<String> {
        let agent = agent.to_lowercase();
        let role_profile = self
            .config
            .get(&agent)
            .and_then(|profile| profile.roles.get(role));

        if let Some(path) = role_profile.and_then(|r| r.prompt_path.as_deref())
            && let Some(text) = read_prompt_file(path)
        {
            return Some(text);
        }

        if let Some(dir) = &self.prompts_dir
            && let Some(text) = read_prompt_file(&dir.join(&agent).join(format!("{role}.txt")))
        {
            return Some(text);
        }

        role_profile
            .and_then(|r| r.prompt.as_deref())
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
    }
}

impl PromptStore for PromptLibrary<'_> {
    fn resolve(&self, agent: &str, role: &str) -> PromptLookup {
        if let Some(text) = self.role_prompt(agent, role) {
            return PromptLookup::Found(text);
        }
        if role != DEFAULT_ROLE
            && let Some(text) = self.role_prompt(agent, DEFAULT_ROLE)
        {
            return PromptLookup::Fallback(text);
        }
        PromptLookup::NotFound
    }

    fn location_hint(&self, agent: &str) -> String {
        match &self.prompts_dir {
            Some(dir) => dir
                .join(agent.to_lowercase())
                .join(format!("{DEFAULT_ROLE}.txt"))
                .display()
                .to_string(),
            None => format!("<prompts_dir>/{}/{}.txt", agent.to_lowercase(), DEFAULT_ROLE),
        }
    }
}

/// Read a prompt file; missing, unreadable and blank files all yield `None`.
fn read_prompt_file(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => None,
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read prompt file");
            None
        }
    }
}
