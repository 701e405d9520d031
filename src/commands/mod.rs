//! Command implementations for clink.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every handler returns the process exit code on success
//! so that invocation outcomes (agent error, timeout, ...) can be reported
//! without being treated as clink errors.

mod agents;
mod run;

use crate::cli::{Cli, Command};
use clink::agent::prompt::PromptLibrary;
use clink::config::{AgentsConfig, ConfigSources};
use clink::error::{ClinkError, Result};
use std::path::PathBuf;
use tracing::debug;

/// Loaded configuration shared by all commands.
pub struct Context {
    pub config: AgentsConfig,
    pub prompts_dir: Option<PathBuf>,
}

impl Context {
    /// Load the layered registry for the current directory.
    pub fn load(config: Option<PathBuf>, prompts_dir: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            ClinkError::UserError(format!("failed to determine current directory: {}", e))
        })?;
        let config = ConfigSources::standard(config, &cwd).load()?;
        debug!(agents = %config.available_agents(), "agent registry loaded");
        Ok(Self {
            config,
            prompts_dir,
        })
    }

    pub fn prompts(&self) -> PromptLibrary<'_> {
        PromptLibrary::new(&self.config).with_prompts_dir(self.prompts_dir.clone())
    }
}

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let ctx = Context::load(cli.config, cli.prompts_dir)?;

    match cli.command {
        Command::Run(args) => run::cmd_run(&ctx, args),
        Command::List => agents::cmd_list(&ctx),
        Command::Roles(args) => agents::cmd_roles(&ctx, args),
        Command::Show(args) => agents::cmd_show(&ctx, args),
    }
}
