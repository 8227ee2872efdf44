use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// "openai" | "ollama" | "script"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub script: ScriptConfig,
}

fn default_provider() -> String {
    "script".into()
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
            script: ScriptConfig::default(),
        }
    }
}

/// Any OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".into()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Local models can be slow to load
    #[serde(default = "default_ollama_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".into()
}

fn default_ollama_model() -> String {
    "qwen2.5:7b".into()
}

fn default_ollama_timeout_secs() -> u64 {
    300
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            temperature: default_temperature(),
            timeout_secs: default_ollama_timeout_secs(),
        }
    }
}

/// External script speaking JSON over stdin/stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default = "default_script_path")]
    pub script_path: String,
    /// Defaults to the config directory
    #[serde(default)]
    pub working_dir: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_interpreter() -> String {
    "python3".into()
}

fn default_script_path() -> String {
    "scripts/llm_bridge.py".into()
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            script_path: default_script_path(),
            working_dir: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
