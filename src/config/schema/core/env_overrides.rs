use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("CHAINPILOT_REASONING_PROVIDER")
            && !provider.is_empty()
        {
            self.reasoning.provider = provider;
        }

        if let Ok(key) =
            std::env::var("CHAINPILOT_OPENAI_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
            && !key.is_empty()
            && self.reasoning.openai.api_key.is_none()
        {
            self.reasoning.openai.api_key = Some(key);
        }

        if let Ok(driver) = std::env::var("CHAINPILOT_STORAGE_DRIVER")
            && !driver.is_empty()
        {
            self.storage.driver = driver;
        }

        if let Ok(data_dir) = std::env::var("CHAINPILOT_DATA_DIR")
            && !data_dir.is_empty()
        {
            self.storage.data_dir = data_dir;
        }

        if let Ok(depth_str) = std::env::var("CHAINPILOT_MEMORY_DEPTH")
            && let Ok(depth) = depth_str.parse::<usize>()
        {
            self.agent.memory_depth = depth;
        }

        if let Ok(port_str) =
            std::env::var("CHAINPILOT_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) =
            std::env::var("CHAINPILOT_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(level) = std::env::var("CHAINPILOT_LOG_LEVEL")
            && !level.is_empty()
        {
            self.logging.level = level;
        }
    }
}
