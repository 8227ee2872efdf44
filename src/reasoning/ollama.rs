use super::parse::parse_reply;
use super::prompt::{SYSTEM_PROMPT, build_user_prompt};
use super::traits::{ReasoningBackend, ReasoningRequest, ReasoningResponse};
use super::{status_error, transport_error};
use crate::config::OllamaConfig;
use crate::error::ReasoningError;
use crate::utils::build_http_client;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND: &str = "ollama";

pub struct OllamaBackend {
    base_url: String,
    model: String,
    temperature: f64,
    timeout: Duration,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    /// Constrains the model to emit valid JSON
    format: &'static str,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

impl OllamaBackend {
    pub fn new(config: &OllamaConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout,
            client: build_http_client(),
        }
    }

    fn build_request(&self, request: &ReasoningRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: build_user_prompt(request),
                },
            ],
            stream: false,
            format: "json",
            options: Options {
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl ReasoningBackend for OllamaBackend {
    fn name(&self) -> &str {
        BACKEND
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(
        &self,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, ReasoningError> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(|e| transport_error(BACKEND, &e))?;

        if !response.status().is_success() {
            return Err(status_error(BACKEND, response).await);
        }

        let chat: ChatResponse = response.json().await.map_err(|e| ReasoningError::Decode {
            backend: BACKEND.to_string(),
            message: e.to_string(),
        })?;
        parse_reply(&chat.message.content)
    }
}
