//! Agent subprocess executor.
//!
//! Runs one resolved descriptor as one child process under a deadline and
//! classifies the outcome into an [`InvocationResult`].
//!
//! stdout and stderr are captured into anonymous temporary files rather
//! than pipes, so a chatty agent can never block on a full pipe and the
//! output written before a timeout is still available afterwards.

use super::command::{
    CommandPlan, build_command, resolve_file_references, resolve_image_references,
};
use super::spawner::{Spawner, SystemSpawner, isolate_process_group, kill_process_tree};
use crate::agent::descriptor::{AgentDescriptor, InvocationRequest};
use crate::error::{ClinkError, Result};
use crate::output::{OutputFormat, normalize};
use crate::result::{InvocationResult, Status};
use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Interval between `try_wait` polls while a child is running.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs agent processes through a [`Spawner`].
#[derive(Debug, Clone)]
pub struct Executor<S = SystemSpawner> {
    spawner: S,
    poll_interval: Duration,
}

impl Executor<SystemSpawner> {
    pub fn new() -> Self {
        Self::with_spawner(SystemSpawner)
    }
}

impl Default for Executor<SystemSpawner> {
    fn default() -> Self {
        Self::new()
    }
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut,
}

struct Captured {
    stdout: String,
    stderr: String,
}

impl Captured {
    /// stdout when it has anything to say, stderr otherwise.
    fn diagnostic(&self) -> String {
        if self.stdout.trim().is_empty() {
            self.stderr.clone()
        } else {
            self.stdout.clone()
        }
    }
}

impl<S: Spawner> Executor<S> {
    pub fn with_spawner(spawner: S) -> Self {
        Self {
            spawner,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Execute `request` using the already resolved `descriptor`.
    ///
    /// Returns `Err` only for problems detected before launch that indicate
    /// a mismatched or malformed descriptor. Every other outcome, including
    /// a missing file reference or executable, is a result status.
    pub fn execute(
        &self,
        descriptor: &AgentDescriptor,
        request: &InvocationRequest,
    ) -> Result<InvocationResult> {
        let requested = request.agent.trim().to_lowercase();
        if requested != descriptor.name() {
            return Err(ClinkError::DescriptorMismatch {
                requested: request.agent.clone(),
                resolved: descriptor.name().to_string(),
            });
        }

        let working_dir = descriptor.working_directory();
        let references = resolve_file_references(working_dir, &request.files).and_then(|files| {
            resolve_image_references(working_dir, &request.images).map(|images| (files, images))
        });
        let (files, images) = match references {
            Ok(references) => references,
            Err(detail) => {
                warn!(agent = descriptor.name(), %detail, "rejecting invocation before launch");
                return Ok(InvocationResult::launch_failure(detail));
            }
        };

        let output_file = match descriptor.output_file() {
            Some(_) => match tempfile::Builder::new()
                .prefix("clink-")
                .suffix(".out")
                .tempfile()
            {
                Ok(file) => Some(file),
                Err(e) => {
                    return Ok(InvocationResult::launch_failure(format!(
                        "failed to create output file: {}",
                        e
                    )));
                }
            },
            None => None,
        };

        let plan = build_command(
            descriptor,
            &request.prompt,
            &files,
            &images,
            output_file.as_ref().map(NamedTempFile::path),
        )
        .map_err(|e| ClinkError::ConfigError(format!("agent '{}' has {}", descriptor.name(), e)))?;

        Ok(self.run(descriptor, &plan, output_file))
    }

    fn run(
        &self,
        descriptor: &AgentDescriptor,
        plan: &CommandPlan,
        output_file: Option<NamedTempFile>,
    ) -> InvocationResult {
        let (stdout_file, stderr_file) = match (tempfile::tempfile(), tempfile::tempfile()) {
            (Ok(out), Ok(err)) => (out, err),
            (Err(e), _) | (_, Err(e)) => {
                return InvocationResult::launch_failure(format!(
                    "failed to create capture files: {}",
                    e
                ));
            }
        };

        let mut command = match prepare_command(descriptor, plan, &stdout_file, &stderr_file) {
            Ok(command) => command,
            Err(e) => {
                return InvocationResult::launch_failure(format!(
                    "failed to prepare capture files: {}",
                    e
                ));
            }
        };

        debug!(
            agent = descriptor.name(),
            role = descriptor.role_name(),
            command = %plan.display(),
            cwd = %plan.working_dir.display(),
            stdin = plan.stdin.is_some(),
            "launching agent"
        );

        let start = Instant::now();
        let mut child = match self.spawner.spawn(&mut command) {
            Ok(child) => child,
            Err(e) => {
                let detail = if e.kind() == ErrorKind::NotFound {
                    format!("executable '{}' not found", plan.program)
                } else {
                    format!("failed to start '{}': {}", plan.program, e)
                };
                warn!(agent = descriptor.name(), %detail, "agent launch failed");
                return InvocationResult::launch_failure(detail);
            }
        };

        let writer = feed_stdin(&mut child, plan.stdin.clone());
        let outcome = wait_with_timeout(&mut child, descriptor.timeout(), self.poll_interval);
        let duration = start.elapsed();
        if let Some(writer) = writer {
            // A surviving descendant may hold stdin open without reading it.
            if writer.is_finished() {
                let _ = writer.join();
            } else {
                debug!(agent = descriptor.name(), "agent exited before reading all of stdin");
            }
        }

        let captured = Captured {
            stdout: read_capture(stdout_file),
            stderr: read_capture(stderr_file),
        };

        let result = match outcome {
            Ok(WaitOutcome::TimedOut) => {
                warn!(
                    agent = descriptor.name(),
                    timeout_secs = descriptor.timeout().as_secs(),
                    "agent timed out, process group killed"
                );
                InvocationResult::failure(
                    Status::Timeout,
                    format!("timed out after {}s", descriptor.timeout().as_secs()),
                    captured.diagnostic(),
                    duration,
                    None,
                )
            }
            Ok(WaitOutcome::Exited(status)) => {
                let file_output = output_file.and_then(|file| take_output_file(descriptor, file));
                classify(descriptor, status, captured, file_output, duration)
            }
            Err(e) => InvocationResult::failure(
                Status::AgentError,
                format!("failed to check process status: {}", e),
                captured.diagnostic(),
                duration,
                None,
            ),
        };

        info!(
            agent = descriptor.name(),
            status = %result.status(),
            duration_ms = duration.as_millis() as u64,
            "agent finished"
        );
        result
    }
}

fn prepare_command(
    descriptor: &AgentDescriptor,
    plan: &CommandPlan,
    stdout_file: &File,
    stderr_file: &File,
) -> io::Result<Command> {
    let mut command = Command::new(&plan.program);
    command
        .args(&plan.args)
        .current_dir(&plan.working_dir)
        .envs(descriptor.environment())
        .stdin(if plan.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::from(stdout_file.try_clone()?))
        .stderr(Stdio::from(stderr_file.try_clone()?));
    isolate_process_group(&mut command);
    Ok(command)
}

/// Write the prompt on a separate thread so a child that never reads its
/// stdin cannot stall the deadline loop.
fn feed_stdin(child: &mut Child, text: Option<String>) -> Option<JoinHandle<()>> {
    let text = text?;
    let mut pipe = child.stdin.take()?;
    Some(std::thread::spawn(move || {
        if let Err(e) = pipe.write_all(text.as_bytes())
            && e.kind() != ErrorKind::BrokenPipe
        {
            debug!(error = %e, "failed to write prompt to agent stdin");
        }
    }))
}

/// Wait for a child process, killing its process group at the deadline.
///
/// A timeout too large to represent as an instant means no deadline.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    poll_interval: Duration,
) -> io::Result<WaitOutcome> {
    let deadline = Instant::now().checked_add(timeout);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(WaitOutcome::Exited(status)),
            Ok(None) => {
                let mut pause = poll_interval;
                if let Some(deadline) = deadline {
                    let now = Instant::now();
                    if now >= deadline {
                        kill_process_tree(child);
                        return Ok(WaitOutcome::TimedOut);
                    }
                    pause = pause.min(deadline - now);
                }
                std::thread::sleep(pause);
            }
            Err(e) => {
                kill_process_tree(child);
                return Err(e);
            }
        }
    }
}

fn read_capture(mut file: File) -> String {
    let mut bytes = Vec::new();
    if let Err(e) = file
        .seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_end(&mut bytes))
    {
        warn!(error = %e, "failed to read captured agent output");
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Read the agent's output file, then delete or keep it per configuration.
fn take_output_file(descriptor: &AgentDescriptor, file: NamedTempFile) -> Option<String> {
    let content = match std::fs::read_to_string(file.path()) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!(path = %file.path().display(), error = %e, "agent output file unreadable");
            None
        }
    };

    let cleanup = descriptor.output_file().is_none_or(|cfg| cfg.cleanup);
    if !cleanup {
        match file.keep() {
            Ok((_, path)) => info!(path = %path.display(), "kept agent output file"),
            Err(e) => warn!(error = %e, "failed to keep agent output file"),
        }
    }

    content.filter(|c| !c.trim().is_empty())
}

fn classify(
    descriptor: &AgentDescriptor,
    status: ExitStatus,
    captured: Captured,
    file_output: Option<String>,
    duration: Duration,
) -> InvocationResult {
    let format = descriptor.output_format();
    let exit_code = status.code();

    // The answer file replaces stdout only when stdout is empty.
    let body = if captured.stdout.trim().is_empty() {
        file_output.unwrap_or_default()
    } else {
        captured.stdout.clone()
    };

    if status.success() {
        if body.trim().is_empty() {
            return InvocationResult::failure(
                Status::AgentError,
                "agent produced no output",
                captured.stderr,
                duration,
                exit_code,
            );
        }
        return normalized(format, body, duration, exit_code);
    }

    if descriptor.recover_on_error()
        && format.is_structured()
        && !body.trim().is_empty()
        && normalize(&body, format).is_ok()
    {
        warn!(
            agent = descriptor.name(),
            exit_code, "agent exited non-zero but produced parseable output"
        );
        return normalized(format, body, duration, exit_code);
    }

    let detail = match exit_code {
        Some(code) => match first_line(&captured.stderr) {
            Some(line) => format!("exited with status {}: {}", code, line),
            None => format!("exited with status {}", code),
        },
        None => "terminated by a signal".to_string(),
    };
    InvocationResult::failure(
        Status::AgentError,
        detail,
        captured.diagnostic(),
        duration,
        exit_code,
    )
}

fn normalized(
    format: OutputFormat,
    raw: String,
    duration: Duration,
    exit_code: Option<i32>,
) -> InvocationResult {
    match normalize(&raw, format) {
        Ok(out) => InvocationResult::success(out.content, out.metadata, raw, duration, exit_code),
        Err(e) => InvocationResult::failure(
            Status::ParseFailure,
            format!("{} output could not be parsed: {}", format, e),
            raw,
            duration,
            exit_code,
        ),
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}
