use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network used by the agent; first entry when empty
    #[serde(default)]
    pub default_network: String,
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    /// Only "evm" is supported
    #[serde(default = "default_kind")]
    pub kind: String,
    pub rpc_url: String,
    #[serde(default)]
    pub description: String,
}

fn default_kind() -> String {
    "evm".into()
}

impl ChainConfig {
    /// Name of the network the agent should execute against, if any.
    pub fn default_network_name(&self) -> Option<&str> {
        if self.default_network.trim().is_empty() {
            self.networks.first().map(|n| n.name.as_str())
        } else {
            Some(self.default_network.trim())
        }
    }
}
