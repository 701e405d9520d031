//! Registry inspection commands: `clink list`, `clink roles`, `clink show`.

use super::Context;
use crate::cli::{RolesArgs, ShowArgs};
use clink::agent::dispatch::build_command;
use clink::agent::{AgentDescriptor, ConfigStore, InvocationRequest, resolve_descriptor};
use clink::config::{AgentsConfig, DEFAULT_ROLE};
use clink::error::{ClinkError, Result};
use clink::exit_codes;
use std::fmt::Write as _;
use std::path::Path;

pub fn cmd_list(ctx: &Context) -> Result<i32> {
    print!("{}", render_list(&ctx.config));
    Ok(exit_codes::SUCCESS)
}

pub fn cmd_roles(ctx: &Context, args: RolesArgs) -> Result<i32> {
    print!("{}", render_roles(&ctx.config, &args.agent)?);
    Ok(exit_codes::SUCCESS)
}

pub fn cmd_show(ctx: &Context, args: ShowArgs) -> Result<i32> {
    let mut request = InvocationRequest::new(args.agent, args.prompt);
    request.role = args.role;

    let prompts = ctx.prompts();
    let descriptor = resolve_descriptor(&ctx.config, &prompts, &request)?;
    print!("{}", render_descriptor(&descriptor, &request.prompt)?);
    Ok(exit_codes::SUCCESS)
}

fn render_list(config: &AgentsConfig) -> String {
    if !config.has_agents() {
        return "No agents configured.\n".to_string();
    }

    let width = config.iter().map(|(id, _)| id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (id, profile) in config.iter() {
        let _ = writeln!(
            out,
            "{:<width$}  {} [{}] roles: {}",
            id,
            profile.display_name(id),
            profile.output_format,
            profile.role_names().join(", "),
            width = width
        );
    }
    out
}

fn render_roles(config: &AgentsConfig, agent: &str) -> Result<String> {
    let (id, profile) = config
        .resolve(agent)
        .ok_or_else(|| ClinkError::UnknownAgent {
            name: agent.to_string(),
            available: config.available_agents(),
        })?;

    let mut out = String::new();
    let _ = writeln!(out, "Roles for {}:", id);
    for name in profile.role_names() {
        let description = profile
            .roles
            .get(name)
            .and_then(|r| r.description.as_deref())
            .unwrap_or(if name == DEFAULT_ROLE {
                "default behavior"
            } else {
                ""
            });
        if description.is_empty() {
            let _ = writeln!(out, "  {}", name);
        } else {
            let _ = writeln!(out, "  {:<12} {}", name, description);
        }
    }
    Ok(out)
}

/// Dry-run view of a resolved descriptor and the command it would run.
fn render_descriptor(descriptor: &AgentDescriptor, prompt: &str) -> Result<String> {
    let output_path = descriptor
        .output_file()
        .map(|_| Path::new("<output-file>"));
    // File references are not validated here; nothing is launched.
    let plan = build_command(descriptor, prompt, &[], &[], output_path).map_err(|e| {
        ClinkError::ConfigError(format!("agent '{}' has {}", descriptor.name(), e))
    })?;

    let role = if descriptor.prompt_fallback() {
        format!("{} (using default role prompt)", descriptor.role_name())
    } else {
        descriptor.role_name().to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "Agent:         {} ({})", descriptor.name(), descriptor.display_name());
    let _ = writeln!(out, "Role:          {}", role);
    let _ = writeln!(out, "Executable:    {}", descriptor.executable());
    let _ = writeln!(out, "Working dir:   {}", descriptor.working_directory().display());
    let _ = writeln!(out, "Timeout:       {}s", descriptor.timeout().as_secs());
    let _ = writeln!(out, "Output format: {}", descriptor.output_format());
    let _ = writeln!(
        out,
        "System prompt: {} characters",
        descriptor.system_prompt().chars().count()
    );
    let _ = writeln!(out, "Command:       {}", plan.display());
    let _ = writeln!(
        out,
        "Prompt via:    {}",
        if plan.stdin.is_some() { "stdin" } else { "argument" }
    );
    if descriptor.recover_on_error() {
        let _ = writeln!(out, "Recovery:      non-zero exits with parseable output count as success");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clink::agent::prompt::PromptLibrary;

    const YAML: &str = r#"
agents:
  tool:
    name: "Tool CLI"
    command: "tool run"
    args: ["--json", "{prompt}"]
    output_format: json
    system_prompt_flag: --system
    roles:
      default:
        prompt: "be brief"
      planner:
        description: "Plans work"
        args: ["--plan"]
"#;

    #[test]
    fn list_shows_agents_with_roles() {
        let config = AgentsConfig::from_yaml(YAML).unwrap();
        let out = render_list(&config);
        assert_eq!(out, "tool  Tool CLI [json] roles: default, planner\n");

        assert_eq!(render_list(&AgentsConfig::default()), "No agents configured.\n");
    }

    #[test]
    fn roles_lists_descriptions() {
        let config = AgentsConfig::from_yaml(YAML).unwrap();
        let out = render_roles(&config, "TOOL").unwrap();
        assert!(out.starts_with("Roles for tool:\n"));
        assert!(out.contains("planner      Plans work"));

        let err = render_roles(&config, "missing").unwrap_err();
        assert!(matches!(err, ClinkError::UnknownAgent { .. }));
    }

    #[test]
    fn show_renders_dry_run_command() {
        let config = AgentsConfig::from_yaml(YAML).unwrap();
        let prompts = PromptLibrary::new(&config);
        let request = InvocationRequest::new("tool", "hello there").with_role("planner");
        let descriptor = resolve_descriptor(&config, &prompts, &request).unwrap();

        let out = render_descriptor(&descriptor, &request.prompt).unwrap();
        assert!(out.contains("Agent:         tool (Tool CLI)"));
        assert!(out.contains("Role:          planner (using default role prompt)"));
        assert!(out.contains("Command:       tool run --json 'hello there' --plan --system 'be brief'"));
        assert!(out.contains("Prompt via:    argument"));
    }
}
