pub mod schema;

pub use schema::{
    AgentConfig, ChainConfig, ClientCredential, Config, GatewayConfig, KnowledgeConfig,
    LoggingConfig, NetworkConfig, OllamaConfig, OpenAiConfig, ReasoningConfig, ScriptConfig,
    StorageConfig,
};
