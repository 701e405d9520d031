//! Resolution of an invocation request into an agent descriptor.
//!
//! # Resolution Order
//!
//! 1. Reject an empty user prompt
//! 2. Look up the agent (unknown agent is an error)
//! 3. Check the role against the agent's valid-role set
//! 4. Resolve the system prompt, falling back to the default role
//! 5. Pick the timeout: request, then profile, then registry default
//! 6. Pick the working directory: request, then profile, then the current directory
//!
//! Every step happens before anything is launched. A descriptor is either
//! fully resolved or not built at all.

use crate::agent::prompt::{PromptLookup, PromptStore};
use crate::agent::store::ConfigStore;
use crate::config::{DEFAULT_ROLE, OutputFileConfig, expand_home};
use crate::error::{ClinkError, Result};
use crate::output::OutputFormat;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// What a caller asks for: one prompt sent to one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub agent: String,
    pub role: Option<String>,
    pub prompt: String,
    pub files: Vec<PathBuf>,
    /// Image paths listed for agents that can read them.
    pub images: Vec<PathBuf>,
    /// Overrides the agent's configured output format.
    pub output_format: Option<OutputFormat>,
    /// Overrides the agent's configured timeout.
    pub timeout_seconds: Option<u64>,
    /// Overrides the agent's configured working directory.
    pub working_dir: Option<PathBuf>,
}

impl InvocationRequest {
    pub fn new(agent: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            role: None,
            prompt: prompt.into(),
            files: Vec::new(),
            images: Vec::new(),
            output_format: None,
            timeout_seconds: None,
            working_dir: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn with_images<I, P>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.images.extend(images.into_iter().map(Into::into));
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Requested role, or `default`.
    pub fn role_name(&self) -> &str {
        self.role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE)
    }
}

/// Fully resolved, ready-to-execute configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDescriptor {
    name: String,
    display_name: String,
    executable: String,
    argument_template: Vec<String>,
    role_args: Vec<String>,
    timeout: Duration,
    working_directory: PathBuf,
    system_prompt: String,
    role_name: String,
    prompt_fallback: bool,
    environment: HashMap<String, String>,
    output_format: OutputFormat,
    system_prompt_flag: Option<String>,
    output_file: Option<OutputFileConfig>,
    recover_on_error: bool,
}

impl AgentDescriptor {
    /// Canonical (lowercase) agent identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Argument fragments following the executable, in launch order.
    ///
    /// Leading words from the configured command come first, escaped so
    /// they render literally.
    pub fn argument_template(&self) -> &[String] {
        &self.argument_template
    }

    /// Extra fragments declared by the selected role.
    pub fn role_args(&self) -> &[String] {
        &self.role_args
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    /// Whether the system prompt came from the default role.
    pub fn prompt_fallback(&self) -> bool {
        self.prompt_fallback
    }

    pub fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn system_prompt_flag(&self) -> Option<&str> {
        self.system_prompt_flag.as_deref()
    }

    pub fn output_file(&self) -> Option<&OutputFileConfig> {
        self.output_file.as_ref()
    }

    pub fn recover_on_error(&self) -> bool {
        self.recover_on_error
    }
}

/// Resolve a request against the configuration and prompt stores.
///
/// # Errors
///
/// - Empty prompt or an invalid timeout/working directory in the request
/// - Agent not configured
/// - Role not declared for the agent
/// - No system prompt for the role or the default role
pub fn resolve_descriptor(
    config: &impl ConfigStore,
    prompts: &impl PromptStore,
    request: &InvocationRequest,
) -> Result<AgentDescriptor> {
    if request.prompt.trim().is_empty() {
        return Err(ClinkError::UserError(
            "prompt cannot be empty\nFix: pass the request text as the prompt argument."
                .to_string(),
        ));
    }

    let (id, profile) =
        config
            .resolve(&request.agent)
            .ok_or_else(|| ClinkError::UnknownAgent {
                name: request.agent.clone(),
                available: config.available(),
            })?;

    let role = request.role_name();
    if !profile.has_role(role) {
        return Err(ClinkError::UnknownRole {
            agent: id.to_string(),
            role: role.to_string(),
            available: profile.role_names().join(", "),
        });
    }

    let (system_prompt, prompt_fallback) = match prompts.resolve(id, role) {
        PromptLookup::Found(text) => (text, false),
        PromptLookup::Fallback(text) => {
            debug!(agent = id, role, "role has no prompt, using default role prompt");
            (text, true)
        }
        PromptLookup::NotFound => {
            return Err(ClinkError::MissingPrompt {
                agent: id.to_string(),
                role: role.to_string(),
                hint: prompts.location_hint(id),
            });
        }
    };

    let timeout_seconds = match request.timeout_seconds {
        Some(0) => {
            return Err(ClinkError::UserError(
                "timeout must be greater than 0 seconds".to_string(),
            ));
        }
        Some(seconds) => seconds,
        None => profile.effective_timeout(config.default_timeout()),
    };

    let working_directory = resolve_working_dir(request, profile.working_dir.as_deref(), id)?;

    // Validated at load time; a profile built in code may still be malformed.
    let mut words = shell_words::split(&profile.command).map_err(|e| {
        ClinkError::ConfigError(format!(
            "agent '{}' has unparseable command '{}': {}",
            id, profile.command, e
        ))
    })?;
    if words.is_empty() {
        return Err(ClinkError::ConfigError(format!(
            "agent '{}' has empty command",
            id
        )));
    }
    let executable = words.remove(0);
    let argument_template = words
        .iter()
        .map(|w| escape_braces(w))
        .chain(profile.args.iter().cloned())
        .collect();

    let role_args = profile
        .roles
        .get(role)
        .map(|r| r.args.clone())
        .unwrap_or_default();

    Ok(AgentDescriptor {
        name: id.to_string(),
        display_name: profile.display_name(id).to_string(),
        executable,
        argument_template,
        role_args,
        timeout: Duration::from_secs(timeout_seconds),
        working_directory,
        system_prompt,
        role_name: role.to_string(),
        prompt_fallback,
        environment: profile.environment.clone(),
        output_format: request.output_format.unwrap_or(profile.output_format),
        system_prompt_flag: profile
            .system_prompt_flag
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string),
        output_file: profile.output_file.clone(),
        recover_on_error: profile.recover_on_error,
    })
}

fn resolve_working_dir(
    request: &InvocationRequest,
    configured: Option<&Path>,
    agent: &str,
) -> Result<PathBuf> {
    if let Some(dir) = &request.working_dir {
        let dir = expand_home(dir);
        if !dir.is_dir() {
            return Err(ClinkError::UserError(format!(
                "working directory '{}' does not exist",
                dir.display()
            )));
        }
        return Ok(dir);
    }

    if let Some(dir) = configured {
        let dir = expand_home(dir);
        if !dir.is_dir() {
            return Err(ClinkError::ConfigError(format!(
                "agent '{}' has working_dir '{}' which does not exist",
                agent,
                dir.display()
            )));
        }
        return Ok(dir);
    }

    std::env::current_dir().map_err(|e| {
        ClinkError::UserError(format!("failed to determine current directory: {}", e))
    })
}

fn escape_braces(word: &str) -> String {
    word.replace('{', "{{").replace('}', "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::PromptLibrary;
    use crate::config::AgentsConfig;
    use tempfile::TempDir;

    const YAML: &str = r#"
defaults:
  timeout_seconds: 60
agents:
  tool:
    name: "Test Tool"
    command: "npx tool-cli"
    args: ["--print", "{prompt}"]
    output_format: json
    environment:
      TOOL_MODE: "quiet"
    roles:
      default:
        prompt: "default prompt"
      planner:
        prompt: "planner prompt"
        args: ["--model", "big"]
      reviewer:
        description: "no prompt of its own"
  bare:
    command: bare
    timeout_seconds: 5
"#;

    fn config() -> AgentsConfig {
        AgentsConfig::from_yaml(YAML).unwrap()
    }

    #[test]
    fn resolves_default_role() {
        let cfg = config();
        let prompts = PromptLibrary::new(&cfg);
        let request = InvocationRequest::new("Tool", "hello");

        let d = resolve_descriptor(&cfg, &prompts, &request).unwrap();
        assert_eq!(d.name(), "tool");
        assert_eq!(d.display_name(), "Test Tool");
        assert_eq!(d.executable(), "npx");
        assert_eq!(d.argument_template(), ["tool-cli", "--print", "{prompt}"]);
        assert!(d.role_args().is_empty());
        assert_eq!(d.role_name(), "default");
        assert_eq!(d.system_prompt(), "default prompt");
        assert!(!d.prompt_fallback());
        assert_eq!(d.timeout(), Duration::from_secs(60));
        assert_eq!(d.output_format(), OutputFormat::Json);
        assert_eq!(d.environment().get("TOOL_MODE").unwrap(), "quiet");
    }

    #[test]
    fn role_args_and_prompt_follow_role() {
        let cfg = config();
        let prompts = PromptLibrary::new(&cfg);
        let request = InvocationRequest::new("tool", "hello").with_role("planner");

        let d = resolve_descriptor(&cfg, &prompts, &request).unwrap();
        assert_eq!(d.role_name(), "planner");
        assert_eq!(d.system_prompt(), "planner prompt");
        assert_eq!(d.role_args(), ["--model", "big"]);
    }

    #[test]
    fn role_without_prompt_uses_default_text() {
        let cfg = config();
        let prompts = PromptLibrary::new(&cfg);
        let request = InvocationRequest::new("tool", "hello").with_role("reviewer");

        let d = resolve_descriptor(&cfg, &prompts, &request).unwrap();
        assert_eq!(d.system_prompt(), "default prompt");
        assert!(d.prompt_fallback());
    }

    #[test]
    fn unknown_agent_lists_available() {
        let cfg = config();
        let prompts = PromptLibrary::new(&cfg);
        let err = resolve_descriptor(&cfg, &prompts, &InvocationRequest::new("nope", "hi"))
            .unwrap_err();
        match err {
            ClinkError::UnknownAgent { name, available } => {
                assert_eq!(name, "nope");
                assert_eq!(available, "bare, tool");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let cfg = config();
        let prompts = PromptLibrary::new(&cfg);
        let request = InvocationRequest::new("tool", "hi").with_role("astronaut");
        let err = resolve_descriptor(&cfg, &prompts, &request).unwrap_err();
        assert!(matches!(err, ClinkError::UnknownRole { ref role, .. } if role == "astronaut"));
        assert!(err.to_string().contains("default, planner, reviewer"));
    }

    #[test]
    fn agent_without_any_prompt_is_missing_prompt() {
        let cfg = config();
        let prompts = PromptLibrary::new(&cfg);
        let err = resolve_descriptor(&cfg, &prompts, &InvocationRequest::new("bare", "hi"))
            .unwrap_err();
        assert!(matches!(err, ClinkError::MissingPrompt { .. }));
        assert!(err.to_string().contains("Fix:"));
    }

    #[test]
    fn empty_prompt_is_user_error() {
        let cfg = config();
        let prompts = PromptLibrary::new(&cfg);
        let err = resolve_descriptor(&cfg, &prompts, &InvocationRequest::new("tool", "  \n"))
            .unwrap_err();
        assert!(matches!(err, ClinkError::UserError(_)));
    }

    #[test]
    fn timeout_precedence() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("bare")).unwrap();
        std::fs::write(temp_dir.path().join("bare/default.txt"), "bare prompt").unwrap();

        let cfg = config();
        let prompts = PromptLibrary::new(&cfg).with_prompts_dir(Some(temp_dir.path().into()));

        let d = resolve_descriptor(&cfg, &prompts, &InvocationRequest::new("bare", "hi")).unwrap();
        assert_eq!(d.timeout(), Duration::from_secs(5));
        assert_eq!(d.system_prompt(), "bare prompt");

        let d = resolve_descriptor(
            &cfg,
            &prompts,
            &InvocationRequest::new("bare", "hi").with_timeout(2),
        )
        .unwrap();
        assert_eq!(d.timeout(), Duration::from_secs(2));

        let err = resolve_descriptor(
            &cfg,
            &prompts,
            &InvocationRequest::new("bare", "hi").with_timeout(0),
        )
        .unwrap_err();
        assert!(matches!(err, ClinkError::UserError(_)));
    }

    #[test]
    fn request_format_overrides_profile() {
        let cfg = config();
        let prompts = PromptLibrary::new(&cfg);
        let request = InvocationRequest::new("tool", "hi").with_output_format(OutputFormat::Text);
        let d = resolve_descriptor(&cfg, &prompts, &request).unwrap();
        assert_eq!(d.output_format(), OutputFormat::Text);
    }

    #[test]
    fn working_dir_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = config();
        let prompts = PromptLibrary::new(&cfg);

        let request = InvocationRequest::new("tool", "hi").with_working_dir(temp_dir.path());
        let d = resolve_descriptor(&cfg, &prompts, &request).unwrap();
        assert_eq!(d.working_directory(), temp_dir.path());

        let request =
            InvocationRequest::new("tool", "hi").with_working_dir(temp_dir.path().join("missing"));
        let err = resolve_descriptor(&cfg, &prompts, &request).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn braces_in_command_words_are_escaped() {
        let cfg = AgentsConfig::from_yaml(
            r#"
agents:
  odd:
    command: 'tool --cfg={x}'
    roles:
      default:
        prompt: "p"
"#,
        )
        .unwrap();
        let prompts = PromptLibrary::new(&cfg);
        let d = resolve_descriptor(&cfg, &prompts, &InvocationRequest::new("odd", "hi")).unwrap();
        assert_eq!(d.argument_template(), ["--cfg={{x}}"]);
    }

    #[test]
    fn every_builtin_agent_resolves() {
        let cfg = AgentsConfig::builtin();
        let prompts = PromptLibrary::new(&cfg);
        for (id, profile) in cfg.iter() {
            for role in profile.role_names() {
                let request = InvocationRequest::new(id, "hi").with_role(role);
                let d = resolve_descriptor(&cfg, &prompts, &request).unwrap();
                assert!(!d.system_prompt().trim().is_empty());
            }
        }
    }
}
