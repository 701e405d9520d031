//! Read-only access to agent profiles during resolution.

use crate::config::{AgentProfile, AgentsConfig};

/// Source of agent profiles, looked up by identifier.
pub trait ConfigStore {
    /// Find an agent by identifier (case-insensitive), returning the
    /// canonical identifier alongside the profile.
    fn resolve(&self, agent: &str) -> Option<(&str, &AgentProfile)>;

    /// Timeout applied when neither the request nor the profile sets one.
    fn default_timeout(&self) -> Option<u64> {
        None
    }

    /// Known identifiers, for error messages.
    fn available(&self) -> String;
}

impl ConfigStore for AgentsConfig {
    fn resolve(&self, agent: &str) -> Option<(&str, &AgentProfile)> {
        self.agents
            .get_key_value(&agent.trim().to_lowercase())
            .map(|(id, profile)| (id.as_str(), profile))
    }

    fn default_timeout(&self) -> Option<u64> {
        self.defaults.timeout_seconds
    }

    fn available(&self) -> String {
        self.available_agents()
    }
}
