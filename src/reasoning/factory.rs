use super::script::resolve_script_path;
use super::{OllamaBackend, OpenAiBackend, ReasoningBackend, ScriptBackend};
use crate::config::{Config, OpenAiConfig};
use std::sync::Arc;
use std::time::Duration;

/// API key resolution order: explicit config value, the configured
/// environment variable, then `OPENAI_API_KEY`.
pub fn resolve_api_key(config: &OpenAiConfig) -> Option<String> {
    if let Some(key) = config.api_key.as_deref().map(str::trim)
        && !key.is_empty()
    {
        return Some(key.to_string());
    }

    [config.api_key_env.as_str(), "OPENAI_API_KEY"]
        .into_iter()
        .filter(|name| !name.is_empty())
        .find_map(|name| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// Build the reasoning backend selected by `[reasoning] provider`.
pub fn create_backend(config: &Config) -> anyhow::Result<Arc<dyn ReasoningBackend>> {
    let reasoning = &config.reasoning;
    let backend: Arc<dyn ReasoningBackend> = match reasoning.provider.as_str() {
        "openai" => {
            let api_key = resolve_api_key(&reasoning.openai);
            if api_key.is_none() && reasoning.openai.base_url.contains("api.openai.com") {
                anyhow::bail!(
                    "OpenAI API key not set. Set [reasoning.openai] api_key or export {}",
                    reasoning.openai.api_key_env
                );
            }
            Arc::new(OpenAiBackend::new(&reasoning.openai, api_key.as_deref()))
        }
        "ollama" => Arc::new(OllamaBackend::new(&reasoning.ollama)),
        "script" => {
            let script = &reasoning.script;
            let working_dir = script
                .working_dir
                .as_deref()
                .map_or_else(|| config.base_dir.clone(), |dir| config.resolve_path(dir));
            let script_path = resolve_script_path(&config.base_dir, &script.script_path);
            if !script_path.exists() {
                tracing::warn!(
                    path = %script_path.display(),
                    "reasoning script not found; generation will fail until it exists"
                );
            }
            Arc::new(ScriptBackend::new(
                script.interpreter.clone(),
                script_path,
                working_dir,
                Duration::from_secs(script.timeout_secs.max(1)),
            ))
        }
        other => {
            anyhow::bail!("Unknown reasoning provider '{other}'. Supported: openai, ollama, script");
        }
    };

    tracing::info!(backend = backend.name(), "reasoning backend ready");
    Ok(backend)
}
