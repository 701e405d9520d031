//! Agent invocation subsystem.
//!
//! This module provides the core dispatch pipeline:
//!
//! - **Store**: Agent profile lookup
//! - **Prompt**: System-prompt lookup and prompt assembly
//! - **Descriptor**: Resolution of a request into a ready-to-run descriptor
//! - **Dispatch**: Subprocess execution with timeout and output capture
//!
//! # Design Philosophy
//!
//! Agents are plain data: any installed CLI tool can be described in
//! `agents.yaml` without a dedicated type. Everything that can be wrong with
//! a request is found before a process starts; everything that happens after
//! a process starts is reported as a result status.

mod descriptor;
pub mod dispatch;
pub mod prompt;
mod store;

// Re-export public API
pub use descriptor::{AgentDescriptor, InvocationRequest, resolve_descriptor};
pub use dispatch::{Executor, Spawner, SystemSpawner};
pub use store::ConfigStore;

use crate::error::Result;
use crate::result::InvocationResult;
use prompt::PromptStore;

/// Resolve and execute one request.
///
/// Resolution errors are returned before any process is spawned.
pub fn invoke<S: Spawner>(
    config: &impl ConfigStore,
    prompts: &impl PromptStore,
    executor: &Executor<S>,
    request: &InvocationRequest,
) -> Result<InvocationResult> {
    let descriptor = resolve_descriptor(config, prompts, request)?;
    executor.execute(&descriptor, request)
}
