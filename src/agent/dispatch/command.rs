//! Construction of the concrete command line for one invocation.
//!
//! # Argument Order
//!
//! 1. Leading words of the configured command
//! 2. The agent's argument template
//! 3. The role's extra arguments
//! 4. `<system_prompt_flag> <system prompt>`, only when no fragment has a
//!    `{system_prompt}` slot and the flag is not already present
//! 5. The output-file flag, when output-to-file mode is configured
//!
//! # Prompt Delivery
//!
//! - No `{prompt}` slot: the prompt is written to the child's stdin
//! - No `{files}` slot: file references are listed in the prompt text
//! - Image attachments are always listed in the prompt text
//! - No `{system_prompt}` slot and no flag: the system prompt is prepended
//!   to the prompt text

use crate::agent::descriptor::AgentDescriptor;
use crate::agent::prompt::{
    FileReference, TemplateError, compose_prompt, mentions_placeholder, render_template, vars,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error building a command from a resolved descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid argument '{fragment}': {source}")]
    Template {
        fragment: String,
        #[source]
        source: TemplateError,
    },

    #[error("invalid output file flag '{flag}': {reason}")]
    OutputFlag { flag: String, reason: String },
}

/// A fully rendered command, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub program: String,
    pub args: Vec<String>,
    /// Text written to the child's stdin, when the prompt has no argument slot.
    pub stdin: Option<String>,
    pub working_dir: PathBuf,
}

impl CommandPlan {
    /// Shell-quoted rendering for logs and dry runs.
    pub fn display(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }
}

/// Check that every file reference exists, relative to `working_dir`.
///
/// Paths are kept as given so the agent sees the caller's spelling.
pub fn resolve_file_references(
    working_dir: &Path,
    files: &[PathBuf],
) -> Result<Vec<FileReference>, String> {
    resolve_references("file reference", working_dir, files)
}

/// Check that every image attachment exists, relative to `working_dir`.
pub fn resolve_image_references(
    working_dir: &Path,
    images: &[PathBuf],
) -> Result<Vec<FileReference>, String> {
    resolve_references("image", working_dir, images)
}

fn resolve_references(
    kind: &str,
    working_dir: &Path,
    paths: &[PathBuf],
) -> Result<Vec<FileReference>, String> {
    paths
        .iter()
        .map(|path| {
            let on_disk = if path.is_absolute() {
                path.clone()
            } else {
                working_dir.join(path)
            };
            let metadata = std::fs::metadata(&on_disk).map_err(|e| {
                format!("{} '{}' is not accessible: {}", kind, path.display(), e)
            })?;
            Ok(FileReference {
                path: path.clone(),
                size: metadata.len(),
            })
        })
        .collect()
}

/// Render the command for `descriptor` with the given user prompt, files and
/// images.
///
/// `output_path` is substituted into the output-file flag when the
/// descriptor has output-to-file mode configured.
pub fn build_command(
    descriptor: &AgentDescriptor,
    prompt: &str,
    files: &[FileReference],
    images: &[FileReference],
    output_path: Option<&Path>,
) -> Result<CommandPlan, BuildError> {
    let fragments: Vec<&String> = descriptor
        .argument_template()
        .iter()
        .chain(descriptor.role_args())
        .collect();

    let has_slot = |name: &str| fragments.iter().any(|f| mentions_placeholder(f, name));
    let prompt_slot = has_slot("prompt");
    let files_slot = has_slot("files");
    let system_slot = has_slot("system_prompt");

    let system_flag = descriptor
        .system_prompt_flag()
        .filter(|_| !system_slot)
        .map(|flag| (flag, fragments.iter().any(|f| f.as_str() == flag)));

    // Inline the system prompt only when there is nowhere else for it to go.
    let inline_system = !system_slot && system_flag.is_none();
    let listed: &[FileReference] = if files_slot { &[] } else { files };
    let delivered = compose_prompt(
        inline_system.then_some(descriptor.system_prompt()),
        listed,
        images,
        prompt,
    );

    let file_args: Vec<String> = files
        .iter()
        .map(|f| f.path.display().to_string())
        .collect();
    let variables = vars([
        ("system_prompt", descriptor.system_prompt().to_string()),
        ("prompt", delivered.clone()),
        ("files", file_args.join(" ")),
        ("role", descriptor.role_name().to_string()),
    ]);

    let mut args = Vec::with_capacity(fragments.len() + 4);
    for fragment in &fragments {
        if fragment.trim() == "{files}" {
            args.extend(file_args.iter().cloned());
            continue;
        }
        let rendered = render_template(fragment, &variables).map_err(|source| {
            BuildError::Template {
                fragment: fragment.to_string(),
                source,
            }
        })?;
        args.push(rendered);
    }

    if let Some((flag, false)) = system_flag {
        args.push(flag.to_string());
        args.push(descriptor.system_prompt().to_string());
    }

    if let (Some(output_file), Some(path)) = (descriptor.output_file(), output_path) {
        let rendered = render_template(
            &output_file.flag_template,
            &vars([("path", shell_words::quote(&path.display().to_string()).into_owned())]),
        )
        .map_err(|e| BuildError::OutputFlag {
            flag: output_file.flag_template.clone(),
            reason: e.to_string(),
        })?;
        let words = shell_words::split(&rendered).map_err(|e| BuildError::OutputFlag {
            flag: output_file.flag_template.clone(),
            reason: e.to_string(),
        })?;
        args.extend(words);
    }

    Ok(CommandPlan {
        program: descriptor.executable().to_string(),
        args,
        stdin: (!prompt_slot).then_some(delivered),
        working_dir: descriptor.working_directory().to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::descriptor::{InvocationRequest, resolve_descriptor};
    use crate::agent::prompt::PromptLibrary;
    use crate::config::AgentsConfig;
    use tempfile::TempDir;

    fn descriptor(yaml: &str, role: Option<&str>) -> AgentDescriptor {
        let cfg = AgentsConfig::from_yaml(yaml).unwrap();
        let prompts = PromptLibrary::new(&cfg);
        let mut request = InvocationRequest::new("tool", "ignored");
        if let Some(role) = role {
            request = request.with_role(role);
        }
        resolve_descriptor(&cfg, &prompts, &request).unwrap()
    }

    fn file(path: &str, size: u64) -> FileReference {
        FileReference {
            path: PathBuf::from(path),
            size,
        }
    }

    #[test]
    fn substitutes_slots_in_template_order() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: tool
    args: ["--sys", "{system_prompt}", "--role={role}", "{prompt}", "{files}"]
    roles:
      default:
        prompt: "SYS"
"#,
            None,
        );
        let files = [file("a.rs", 1), file("b.rs", 2)];
        let plan = build_command(&d, "do it", &files, &[], None).unwrap();
        assert_eq!(plan.program, "tool");
        assert_eq!(
            plan.args,
            ["--sys", "SYS", "--role=default", "do it", "a.rs", "b.rs"]
        );
        assert_eq!(plan.stdin, None);
    }

    #[test]
    fn exact_files_fragment_with_no_files_adds_nothing() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: tool
    args: ["{files}", "{system_prompt}", "{prompt}"]
    roles:
      default:
        prompt: "SYS"
"#,
            None,
        );
        let plan = build_command(&d, "hi", &[], &[], None).unwrap();
        assert_eq!(plan.args, ["SYS", "hi"]);
    }

    #[test]
    fn embedded_files_are_space_joined() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: tool
    args: ["--include={files}", "{system_prompt}", "{prompt}"]
    roles:
      default:
        prompt: "SYS"
"#,
            None,
        );
        let plan = build_command(&d, "hi", &[file("a", 1), file("b", 1)], &[], None).unwrap();
        assert_eq!(plan.args[0], "--include=a b");
    }

    #[test]
    fn images_are_listed_even_with_a_files_slot() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: tool
    args: ["{system_prompt}", "{prompt}", "{files}"]
    roles:
      default:
        prompt: "SYS"
"#,
            None,
        );
        let plan = build_command(
            &d,
            "what changed?",
            &[file("a.rs", 1)],
            &[file("before.png", 100), file("after.png", 120)],
            None,
        )
        .unwrap();
        assert_eq!(
            plan.args,
            [
                "SYS",
                "=== IMAGES ===\n- before.png\n- after.png\n\n=== USER REQUEST ===\nwhat changed?",
                "a.rs",
            ]
        );
    }

    #[test]
    fn missing_prompt_slot_uses_stdin_with_inlined_context() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: "tool exec"
    args: ["--json"]
    roles:
      default:
        prompt: "SYS"
"#,
            None,
        );
        let plan = build_command(&d, "review", &[file("src/lib.rs", 10)], &[], None).unwrap();
        assert_eq!(plan.args, ["exec", "--json"]);
        let stdin = plan.stdin.unwrap();
        assert!(stdin.starts_with("=== SYSTEM PROMPT ===\nSYS"));
        assert!(stdin.contains("- src/lib.rs (10 bytes)"));
        assert!(stdin.ends_with("=== USER REQUEST ===\nreview"));
    }

    #[test]
    fn system_prompt_flag_follows_role_args() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: tool
    args: ["--print", "{prompt}"]
    system_prompt_flag: --append-system-prompt
    roles:
      default:
        prompt: "SYS"
      planner:
        prompt: "PLAN"
        args: ["--model", "big"]
"#,
            Some("planner"),
        );
        let plan = build_command(&d, "hi", &[], &[], None).unwrap();
        assert_eq!(
            plan.args,
            [
                "--print",
                "hi",
                "--model",
                "big",
                "--append-system-prompt",
                "PLAN"
            ]
        );
    }

    #[test]
    fn system_prompt_flag_not_duplicated() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: tool
    args: ["--append-system-prompt", "fixed", "{prompt}"]
    system_prompt_flag: --append-system-prompt
    roles:
      default:
        prompt: "SYS"
"#,
            None,
        );
        let plan = build_command(&d, "hi", &[], &[], None).unwrap();
        assert_eq!(plan.args, ["--append-system-prompt", "fixed", "hi"]);
    }

    #[test]
    fn system_prompt_slot_takes_precedence_over_flag() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: tool
    args: ["{system_prompt}\n\n{prompt}"]
    system_prompt_flag: --system
    roles:
      default:
        prompt: "SYS"
"#,
            None,
        );
        let plan = build_command(&d, "hi", &[], &[], None).unwrap();
        assert_eq!(plan.args, ["SYS\n\nhi"]);
    }

    #[test]
    fn prompt_braces_pass_through() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: tool
    args: ["{system_prompt}", "{prompt}"]
    roles:
      default:
        prompt: "SYS"
"#,
            None,
        );
        let plan = build_command(&d, "fn f() { {role} }", &[], &[], None).unwrap();
        assert_eq!(plan.args[1], "fn f() { {role} }");
    }

    #[test]
    fn output_file_flag_is_appended_last() {
        let d = descriptor(
            r#"
agents:
  tool:
    command: tool
    args: ["{system_prompt}", "{prompt}"]
    output_file:
      flag_template: "--output-last-message {path}"
    roles:
      default:
        prompt: "SYS"
"#,
            None,
        );
        let plan = build_command(&d, "hi", &[], &[], Some(Path::new("/tmp/out file.txt"))).unwrap();
        assert_eq!(
            plan.args,
            ["SYS", "hi", "--output-last-message", "/tmp/out file.txt"]
        );

        let plan = build_command(&d, "hi", &[], &[], None).unwrap();
        assert_eq!(plan.args, ["SYS", "hi"]);
    }

    #[test]
    fn display_quotes_arguments() {
        let plan = CommandPlan {
            program: "tool".to_string(),
            args: vec!["--print".to_string(), "two words".to_string()],
            stdin: None,
            working_dir: PathBuf::from("."),
        };
        assert_eq!(plan.display(), "tool --print 'two words'");
    }

    #[test]
    fn file_references_resolve_against_working_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.md"), "12345").unwrap();

        let refs =
            resolve_file_references(temp_dir.path(), &[PathBuf::from("notes.md")]).unwrap();
        assert_eq!(refs, vec![file("notes.md", 5)]);

        let err = resolve_file_references(temp_dir.path(), &[PathBuf::from("missing.md")])
            .unwrap_err();
        assert!(err.contains("missing.md"));
    }

    #[test]
    fn image_references_report_their_kind() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("shot.png"), [0u8; 3]).unwrap();

        let refs =
            resolve_image_references(temp_dir.path(), &[PathBuf::from("shot.png")]).unwrap();
        assert_eq!(refs, vec![file("shot.png", 3)]);

        let err = resolve_image_references(temp_dir.path(), &[PathBuf::from("gone.png")])
            .unwrap_err();
        assert!(err.starts_with("image 'gone.png' is not accessible"));
    }
}
