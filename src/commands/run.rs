//! `clink run`: resolve, execute and render one invocation.

use super::Context;
use crate::cli::RunArgs;
use clink::agent::{Executor, InvocationRequest, resolve_descriptor};
use clink::error::{ClinkError, Result};
use clink::exit_codes;
use clink::output::{LimitedOutput, apply_output_limit};
use clink::result::{InvocationResult, Metadata, Status};
use serde::Serialize;

/// Machine-readable rendering of a result (`--json`).
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    agent: &'a str,
    role: &'a str,
    status: Status,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_limited: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_chars: Option<usize>,
    raw_output: &'a str,
    metadata: &'a Metadata,
    duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

pub fn cmd_run(ctx: &Context, args: RunArgs) -> Result<i32> {
    let mut request = InvocationRequest::new(args.agent, args.prompt)
        .with_files(args.files)
        .with_images(args.images);
    request.role = args.role;
    request.output_format = args.format;
    request.timeout_seconds = args.timeout;
    request.working_dir = args.cwd;

    let prompts = ctx.prompts();
    let descriptor = resolve_descriptor(&ctx.config, &prompts, &request)?;
    let result = Executor::new().execute(&descriptor, &request)?;

    if args.json {
        println!(
            "{}",
            render_json(descriptor.name(), descriptor.role_name(), &result)?
        );
    } else if result.is_success() {
        println!("{}", apply_output_limit(result.content()).text());
    } else {
        eprintln!("{}", render_failure(descriptor.name(), &result));
    }

    Ok(exit_codes::for_status(result.status()))
}

fn render_json(agent: &str, role: &str, result: &InvocationResult) -> Result<String> {
    let limited = apply_output_limit(result.content());
    let (content_limited, original_chars) = match &limited {
        LimitedOutput::Full(_) => (None, None),
        LimitedOutput::Summarized { original_chars, .. } => {
            (Some("summarized"), Some(*original_chars))
        }
        LimitedOutput::Truncated { original_chars, .. } => {
            (Some("truncated"), Some(*original_chars))
        }
    };

    let envelope = Envelope {
        agent,
        role,
        status: result.status(),
        content: limited.text(),
        content_limited,
        original_chars,
        raw_output: result.raw_output(),
        metadata: result.metadata(),
        duration_seconds: result.duration().as_secs_f64(),
        exit_code: result.exit_code(),
        detail: result.detail(),
    };

    serde_json::to_string_pretty(&envelope)
        .map_err(|e| ClinkError::UserError(format!("failed to serialize result: {}", e)))
}

/// Human-readable report for a non-success outcome, written to stderr.
fn render_failure(agent: &str, result: &InvocationResult) -> String {
    let mut out = format!("Error: agent '{}' finished with status {}", agent, result.status());
    if let Some(detail) = result.detail() {
        out.push_str(&format!(": {}", detail));
    }

    let raw = result.raw_output().trim();
    if !raw.is_empty() {
        out.push_str("\n\n--- agent output ---\n");
        out.push_str(apply_output_limit(raw).text());
    }

    let hint = match result.status() {
        Status::LaunchFailure => Some(
            "check that the agent CLI is installed and on PATH, and that referenced files exist.",
        ),
        Status::Timeout => Some("raise the limit with --timeout or timeout_seconds in agents.yaml."),
        Status::ParseFailure => Some("retry with --format text to accept freeform output."),
        Status::AgentError | Status::Success => None,
    };
    if let Some(hint) = hint {
        out.push_str("\n\nFix: ");
        out.push_str(hint);
    }
    out
}
