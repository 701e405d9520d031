//! Layered registry discovery.
//!
//! Load order (later overrides earlier):
//! 1. Built-in profiles (gemini, codex, claude)
//! 2. User config: `<config_dir>/clink/agents.yaml`
//! 3. Project config: `./clink.yaml`
//! 4. Explicit config: `--config <path>` or `$CLINK_CONFIG`

use super::model::AgentsConfig;
use crate::error::{ClinkError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CLINK_CONFIG";

/// Project-level config file name, looked up in the current directory.
pub const PROJECT_CONFIG_FILE: &str = "clink.yaml";

/// Where each configuration layer comes from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub user: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
}

impl ConfigSources {
    /// Standard locations, honoring an explicit path or `$CLINK_CONFIG`.
    pub fn standard(explicit: Option<PathBuf>, cwd: &Path) -> Self {
        let explicit = explicit.or_else(|| {
            std::env::var_os(CONFIG_ENV_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });
        Self {
            user: dirs::config_dir().map(|d| d.join("clink").join("agents.yaml")),
            project: Some(cwd.join(PROJECT_CONFIG_FILE)),
            explicit,
        }
    }

    /// Build the registry by layering every source over the built-ins.
    ///
    /// Missing user/project files are skipped; a missing explicit file is an error.
    pub fn load(&self) -> Result<AgentsConfig> {
        let mut config = AgentsConfig::builtin();

        for path in [&self.user, &self.project].into_iter().flatten() {
            if let Some(layer) = AgentsConfig::load(path)? {
                debug!(path = %path.display(), agents = layer.agents.len(), "loaded config layer");
                config.merge(layer);
            }
        }

        if let Some(path) = &self.explicit {
            let layer = AgentsConfig::load(path)?.ok_or_else(|| {
                ClinkError::ConfigError(format!(
                    "config file '{}' not found\n\
                     Fix: check the --config path or ${} value.",
                    path.display(),
                    CONFIG_ENV_VAR
                ))
            })?;
            debug!(path = %path.display(), agents = layer.agents.len(), "loaded explicit config");
            config.merge(layer);
        }

        Ok(config)
    }
}
