//! CLI argument parsing for clink.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use clink::output::OutputFormat;
use std::path::PathBuf;

/// clink: send a prompt to an installed command-line AI agent.
///
/// Agents (gemini, codex, claude, or anything declared in agents.yaml) are
/// launched as subprocesses with a role-specific system prompt, supervised
/// under a timeout, and their output is normalized into a single answer.
#[derive(Parser, Debug)]
#[command(name = "clink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Agent registry file layered over all other configuration (or $CLINK_CONFIG).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding `<agent>/<role>.txt` system prompts.
    #[arg(long, global = true, value_name = "DIR")]
    pub prompts_dir: Option<PathBuf>,

    /// Increase diagnostic output on stderr (repeatable).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for clink.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a prompt to an agent and print its answer.
    ///
    /// Exits 0 on success, 2 if the agent failed, 3 on timeout,
    /// 4 if it could not be launched, 5 if its output could not be parsed.
    Run(RunArgs),

    /// List configured agents.
    #[command(alias = "agents")]
    List,

    /// List the roles an agent accepts.
    Roles(RolesArgs),

    /// Show the resolved configuration and command line without running it.
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Agent identifier (case-insensitive).
    pub agent: String,

    /// The request to send.
    pub prompt: String,

    /// Role selecting the system prompt.
    #[arg(short, long)]
    pub role: Option<String>,

    /// File to reference in the request (repeatable).
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Image to attach to the request (repeatable).
    #[arg(short = 'i', long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,

    /// Override the agent's output format.
    #[arg(long, value_name = "FORMAT", value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Print a JSON envelope instead of the bare answer.
    #[arg(long)]
    pub json: bool,

    /// Timeout in seconds, overriding the agent's configuration.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Directory to launch the agent from.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct RolesArgs {
    /// Agent identifier.
    pub agent: String,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Agent identifier.
    pub agent: String,

    /// Role to resolve.
    #[arg(short, long)]
    pub role: Option<String>,

    /// Sample prompt used to render the command line.
    #[arg(long, default_value = "<prompt>")]
    pub prompt: String,
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(&value.to_lowercase())
        .ok_or_else(|| format!("unknown format '{}' (expected text, json or json-lines)", value))
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
