use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// JSON catalogue path; empty disables knowledge injection
    #[serde(default)]
    pub source: String,
    /// Cards injected per request (0 disables knowledge injection)
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    3
}

impl KnowledgeConfig {
    pub fn is_enabled(&self) -> bool {
        !self.source.trim().is_empty() && self.max_results > 0
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            max_results: default_max_results(),
        }
    }
}
