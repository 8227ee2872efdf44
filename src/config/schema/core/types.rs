use super::super::{
    AgentConfig, ChainConfig, GatewayConfig, KnowledgeConfig, LoggingConfig, ReasoningConfig,
    StorageConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - set by the loader, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Directory relative paths resolve against - set by the loader, not serialized
    #[serde(skip)]
    pub base_dir: PathBuf,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub reasoning: ReasoningConfig,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Resolve a configured path: `~` is expanded, absolute paths are kept,
    /// relative paths are joined onto the config directory.
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        resolve_against(&self.base_dir, raw)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.resolve_path(&self.storage.data_dir)
    }
}

pub(crate) fn resolve_against(base_dir: &Path, raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw.trim());
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
