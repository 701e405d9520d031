//! Agent subprocess dispatch and execution.
//!
//! This module provides:
//!
//! - Command construction from a resolved descriptor
//! - A spawning seam for tests
//! - Timeout enforcement with process-group termination
//! - Output capture and outcome classification

mod command;
mod executor;
mod spawner;

pub use command::{
    BuildError, CommandPlan, build_command, resolve_file_references, resolve_image_references,
};
pub use executor::Executor;
pub use spawner::{Spawner, SystemSpawner};

/// Placeholders accepted in argument fragments.
pub const ARGUMENT_PLACEHOLDERS: [&str; 4] = ["system_prompt", "prompt", "files", "role"];
