use super::disabled::DisabledExecutor;
use super::evm::EvmExecutor;
use super::traits::ChainExecutor;
use crate::config::ChainConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Named chain executors built from `[[chain.networks]]`.
#[derive(Default)]
pub struct ChainRegistry {
    executors: BTreeMap<String, Arc<dyn ChainExecutor>>,
    default_network: Option<String>,
}

impl ChainRegistry {
    pub fn from_config(config: &ChainConfig, timeout: Duration) -> Self {
        let mut executors: BTreeMap<String, Arc<dyn ChainExecutor>> = BTreeMap::new();
        for network in &config.networks {
            let name = network.name.trim();
            if !network.kind.eq_ignore_ascii_case("evm") {
                tracing::warn!(network = name, kind = %network.kind, "skipping unsupported chain kind");
                continue;
            }
            executors.insert(
                name.to_string(),
                Arc::new(EvmExecutor::new(name, network.rpc_url.trim(), timeout)),
            );
        }

        Self {
            executors,
            default_network: config.default_network_name().map(str::to_string),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ChainExecutor>> {
        self.executors.get(name.trim()).cloned()
    }

    /// Executor for the default network, or [`DisabledExecutor`] when none is configured.
    pub fn default_executor(&self) -> Arc<dyn ChainExecutor> {
        self.default_network
            .as_deref()
            .and_then(|name| self.get(name))
            .unwrap_or_else(|| Arc::new(DisabledExecutor))
    }

    /// Named executor, or the default one when `name` is `None`.
    pub fn resolve(&self, name: Option<&str>) -> Option<Arc<dyn ChainExecutor>> {
        match name {
            Some(name) => self.get(name),
            None => Some(self.default_executor()),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.executors.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}
