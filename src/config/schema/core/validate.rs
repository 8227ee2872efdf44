use super::Config;
use crate::error::ConfigError;

const REASONING_PROVIDERS: [&str; 3] = ["openai", "ollama", "script"];
const STORAGE_DRIVERS: [&str; 2] = ["memory", "sqlite"];

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !REASONING_PROVIDERS.contains(&self.reasoning.provider.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown reasoning provider '{}'. Supported: {}",
                self.reasoning.provider,
                REASONING_PROVIDERS.join(", ")
            )));
        }

        if !STORAGE_DRIVERS.contains(&self.storage.driver.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown storage driver '{}'. Supported: {}",
                self.storage.driver,
                STORAGE_DRIVERS.join(", ")
            )));
        }

        for temperature in [
            self.reasoning.openai.temperature,
            self.reasoning.ollama.temperature,
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::Validation(format!(
                    "temperature {temperature} outside 0.0..=2.0"
                )));
            }
        }

        check_http_url("reasoning.openai.base_url", &self.reasoning.openai.base_url)?;
        check_http_url("reasoning.ollama.base_url", &self.reasoning.ollama.base_url)?;

        for network in &self.chain.networks {
            if network.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "chain network with empty name".into(),
                ));
            }
            if network.kind != "evm" {
                return Err(ConfigError::Validation(format!(
                    "chain network '{}' has unsupported kind '{}'. Supported: evm",
                    network.name, network.kind
                )));
            }
            check_http_url(&format!("chain.networks.{}", network.name), &network.rpc_url)?;
        }

        let default_network = self.chain.default_network.trim();
        if !default_network.is_empty()
            && !self.chain.networks.iter().any(|n| n.name == default_network)
        {
            return Err(ConfigError::Validation(format!(
                "default chain network '{default_network}' is not configured"
            )));
        }

        Ok(())
    }
}

fn check_http_url(field: &str, raw: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| ConfigError::Validation(format!("{field}: invalid URL '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "{field}: unsupported scheme '{other}'"
        ))),
    }
}
