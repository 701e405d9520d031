//! clink: dispatch prompts to installed command-line AI agents.
//!
//! A request names an agent and a role. The agent registry and prompt store
//! resolve it into an [`agent::AgentDescriptor`], the executor runs the
//! agent as a single supervised subprocess, and the output normalizer turns
//! whatever it printed into a uniform [`result::InvocationResult`].
//!
//! ```no_run
//! use clink::agent::{Executor, InvocationRequest, invoke};
//! use clink::agent::prompt::PromptLibrary;
//! use clink::config::ConfigSources;
//!
//! let cwd = std::env::current_dir()?;
//! let config = ConfigSources::standard(None, &cwd).load()?;
//! let prompts = PromptLibrary::new(&config);
//! let request = InvocationRequest::new("claude", "Explain this repository").with_role("default");
//! let result = invoke(&config, &prompts, &Executor::new(), &request)?;
//! println!("{}: {}", result.status(), result.content());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod result;

#[cfg(test)]
pub(crate) mod test_support;
