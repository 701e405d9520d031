//! The uniform outcome of one agent invocation.
//!
//! An [`InvocationResult`] is produced exactly once per call by the dispatch
//! pipeline and is never mutated afterwards: its fields are private and only
//! exposed through accessors. Every failure that happens after resolution
//! (missing file reference, missing executable, timeout, non-zero exit,
//! unparseable structured output) is represented here as a [`Status`] rather
//! than as an error.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Auxiliary fields extracted from structured agent output.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Classification of an invocation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The agent exited zero and its output was normalized.
    Success,
    /// The agent exited with a non-zero status.
    AgentError,
    /// The agent was killed after exceeding its timeout.
    Timeout,
    /// The agent could not be started (or a file reference was invalid).
    LaunchFailure,
    /// The agent succeeded but structured output could not be parsed.
    ParseFailure,
}

impl Status {
    /// Whether this is the only status that carries content.
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::AgentError => write!(f, "agent_error"),
            Status::Timeout => write!(f, "timeout"),
            Status::LaunchFailure => write!(f, "launch_failure"),
            Status::ParseFailure => write!(f, "parse_failure"),
        }
    }
}

/// Result of a single agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    status: Status,
    content: String,
    raw_output: String,
    metadata: Metadata,
    #[serde(rename = "duration_seconds", serialize_with = "serialize_secs")]
    duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl InvocationResult {
    pub(crate) fn success(
        content: String,
        metadata: Metadata,
        raw_output: String,
        duration: Duration,
        exit_code: Option<i32>,
    ) -> Self {
        Self {
            status: Status::Success,
            content,
            raw_output,
            metadata,
            duration,
            exit_code,
            detail: None,
        }
    }

    /// Build a non-success record. Content and metadata are always empty.
    pub(crate) fn failure(
        status: Status,
        detail: impl Into<String>,
        raw_output: String,
        duration: Duration,
        exit_code: Option<i32>,
    ) -> Self {
        debug_assert!(!status.is_success());
        Self {
            status,
            content: String::new(),
            raw_output,
            metadata: Metadata::new(),
            duration,
            exit_code,
            detail: Some(detail.into()),
        }
    }

    /// A launch failure that happened before any process existed.
    pub(crate) fn launch_failure(detail: impl Into<String>) -> Self {
        Self::failure(
            Status::LaunchFailure,
            detail,
            String::new(),
            Duration::ZERO,
            None,
        )
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The primary answer. Empty unless the status is [`Status::Success`].
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The unmodified captured output, kept for diagnostics.
    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Wall-clock time spent in the subprocess call.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Exit code of the process, if it exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Human-readable diagnostic for non-success statuses.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
