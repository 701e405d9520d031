use crate::config::AgentsConfig;
use std::path::{Path, PathBuf};

/// Write a shell script standing in for an agent CLI.
pub(crate) fn write_agent_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    path
}

/// Registry with a single agent `fake` that runs `script` through `sh`.
///
/// The script is passed to `sh` rather than executed directly, so a test
/// never races another thread's fork while the file is still open for
/// writing (ETXTBSY). `extra` is spliced into the agent entry as additional
/// YAML lines (indented four spaces).
pub(crate) fn fake_agent_config(script: &Path, extra: &str) -> AgentsConfig {
    let yaml = format!(
        "agents:\n  fake:\n    command: \"sh '{}'\"\n{}\n    roles:\n      default:\n        prompt: \"Be brief.\"\n",
        script.display(),
        extra
    );
    AgentsConfig::from_yaml(&yaml).unwrap()
}
