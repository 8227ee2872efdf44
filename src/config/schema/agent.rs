use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Prior tasks fed back as context (0 disables history)
    #[serde(default = "default_memory_depth")]
    pub memory_depth: usize,
    /// Reasoning call budget in seconds (0 = backend default)
    #[serde(default)]
    pub llm_timeout_secs: u64,
    /// Chain action budget in seconds, capped by the request deadline
    #[serde(default = "default_chain_timeout_secs")]
    pub chain_timeout_secs: u64,
    /// Outer deadline for one gateway or CLI run
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_memory_depth() -> usize {
    5
}

fn default_chain_timeout_secs() -> u64 {
    15
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl AgentConfig {
    pub fn llm_timeout(&self) -> Option<Duration> {
        (self.llm_timeout_secs > 0).then(|| Duration::from_secs(self.llm_timeout_secs))
    }

    pub fn chain_timeout(&self) -> Duration {
        Duration::from_secs(self.chain_timeout_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            memory_depth: default_memory_depth(),
            llm_timeout_secs: 0,
            chain_timeout_secs: default_chain_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
