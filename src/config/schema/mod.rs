mod agent;
mod chain;
mod core;
mod gateway;
mod knowledge;
mod logging;
mod reasoning;
mod storage;

pub use agent::AgentConfig;
pub use chain::{ChainConfig, NetworkConfig};
pub use self::core::Config;
pub use gateway::{ClientCredential, GatewayConfig};
pub use knowledge::KnowledgeConfig;
pub use logging::LoggingConfig;
pub use reasoning::{OllamaConfig, OpenAiConfig, ReasoningConfig, ScriptConfig};
pub use storage::StorageConfig;
