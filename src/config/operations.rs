//! Registry loading, validation, layering and lookup.

use super::model::{AgentsConfig, AgentProfile};
use crate::agent::dispatch::ARGUMENT_PLACEHOLDERS;
use crate::agent::prompt::check_placeholders;
use crate::error::{ClinkError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

impl AgentsConfig {
    /// Load an agents config from a YAML file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    /// Returns `Err` if the file exists but cannot be parsed or validated.
    /// Relative paths inside the file resolve against its directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ClinkError::ConfigError(format!(
                "failed to read agents config '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_yaml(&content).map_err(|e| match e {
            ClinkError::ConfigError(msg) => {
                ClinkError::ConfigError(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.rebase_paths(base);
        Ok(Some(config))
    }

    /// Parse an agents config from a YAML string.
    ///
    /// Agent identifiers are normalized to lowercase.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: AgentsConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ClinkError::ConfigError(format!("failed to parse agents.yaml: {}", e)))?;

        config.normalize_ids()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the agents configuration.
    ///
    /// Validation rules:
    /// - Agent identifiers and role names must not be empty
    /// - Commands must split into at least one word
    /// - Timeouts must be positive
    /// - Argument templates may only use known placeholders
    /// - Output file flag templates must contain `{path}`
    pub fn validate(&self) -> Result<()> {
        if self.defaults.timeout_seconds == Some(0) {
            return Err(ClinkError::ConfigError(
                "agents.yaml validation failed: defaults.timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        for (id, agent) in &self.agents {
            if id.trim().is_empty() {
                return Err(ClinkError::ConfigError(
                    "agents.yaml validation failed: agent identifier cannot be empty".to_string(),
                ));
            }
            validate_agent(id, agent)?;
        }

        Ok(())
    }

    /// Overlay `other` on top of this config.
    ///
    /// Agents in `other` replace same-named agents wholesale; default settings
    /// are overridden field by field.
    pub fn merge(&mut self, other: AgentsConfig) {
        self.agents.extend(other.agents);
        if other.defaults.timeout_seconds.is_some() {
            self.defaults.timeout_seconds = other.defaults.timeout_seconds;
        }
        if other.defaults.prompts_dir.is_some() {
            self.defaults.prompts_dir = other.defaults.prompts_dir;
        }
        self.defaults.extra.extend(other.defaults.extra);
        self.extra.extend(other.extra);
    }

    /// Get an agent by identifier (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&AgentProfile> {
        self.agents.get(&id.to_lowercase())
    }

    /// Check if any agents are configured.
    pub fn has_agents(&self) -> bool {
        !self.agents.is_empty()
    }

    /// Iterate over all agents in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AgentProfile)> {
        self.agents.iter().map(|(id, a)| (id.as_str(), a))
    }

    /// Comma-separated identifiers, for error messages.
    pub fn available_agents(&self) -> String {
        if self.agents.is_empty() {
            return "(none)".to_string();
        }
        self.agents
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn normalize_ids(&mut self) -> Result<()> {
        let agents = std::mem::take(&mut self.agents);
        let mut normalized = BTreeMap::new();
        for (id, agent) in agents {
            let key = id.trim().to_lowercase();
            if normalized.insert(key.clone(), agent).is_some() {
                return Err(ClinkError::ConfigError(format!(
                    "agents.yaml validation failed: agent '{}' is defined more than once",
                    key
                )));
            }
        }
        self.agents = normalized;
        Ok(())
    }

    /// Resolve relative and `~` paths against `base`.
    fn rebase_paths(&mut self, base: &Path) {
        if let Some(dir) = self.defaults.prompts_dir.take() {
            self.defaults.prompts_dir = Some(rebase(base, &dir));
        }
        for agent in self.agents.values_mut() {
            if let Some(dir) = agent.working_dir.take() {
                agent.working_dir = Some(rebase(base, &dir));
            }
            for role in agent.roles.values_mut() {
                if let Some(path) = role.prompt_path.take() {
                    role.prompt_path = Some(rebase(base, &path));
                }
            }
        }
    }
}

fn validate_agent(id: &str, agent: &AgentProfile) -> Result<()> {
    let fail = |msg: String| {
        Err(ClinkError::ConfigError(format!(
            "agents.yaml validation failed: agent '{}' {}",
            id, msg
        )))
    };

    match shell_words::split(&agent.command) {
        Ok(words) if words.is_empty() => return fail("has empty command".to_string()),
        Ok(_) => {}
        Err(e) => return fail(format!("has unparseable command '{}': {}", agent.command, e)),
    }

    if agent.timeout_seconds == Some(0) {
        return fail("has timeout_seconds of 0".to_string());
    }

    for fragment in &agent.args {
        if let Err(e) = check_placeholders(fragment, &ARGUMENT_PLACEHOLDERS) {
            return fail(format!("has invalid argument '{}': {}", fragment, e));
        }
    }

    if let Some(flag) = &agent.system_prompt_flag
        && flag.trim().is_empty()
    {
        return fail("has empty system_prompt_flag".to_string());
    }

    if let Some(output_file) = &agent.output_file {
        if !output_file.flag_template.contains("{path}") {
            return fail(format!(
                "output_file.flag_template '{}' must contain {{path}}",
                output_file.flag_template
            ));
        }
        if let Err(e) = check_placeholders(&output_file.flag_template, &["path"]) {
            return fail(format!("has invalid output_file.flag_template: {}", e));
        }
    }

    for (role_name, role) in &agent.roles {
        if role_name.trim().is_empty() {
            return fail("has a role with an empty name".to_string());
        }
        for fragment in &role.args {
            if let Err(e) = check_placeholders(fragment, &ARGUMENT_PLACEHOLDERS) {
                return fail(format!(
                    "role '{}' has invalid argument '{}': {}",
                    role_name, fragment, e
                ));
            }
        }
    }

    Ok(())
}

/// Expand a leading `~` and anchor relative paths at `base`.
pub(crate) fn rebase(base: &Path, path: &Path) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

pub(crate) fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
