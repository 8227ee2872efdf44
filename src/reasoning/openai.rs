use super::parse::parse_reply;
use super::prompt::{SYSTEM_PROMPT, build_user_prompt};
use super::traits::{ReasoningBackend, ReasoningRequest, ReasoningResponse};
use super::{status_error, transport_error};
use crate::config::OpenAiConfig;
use crate::error::ReasoningError;
use crate::utils::build_http_client;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND: &str = "openai";

/// OpenAI-compatible chat completions backend.
pub struct OpenAiBackend {
    base_url: String,
    model: String,
    temperature: f64,
    timeout: Duration,
    /// Pre-computed `"Bearer <key>"` header value
    cached_auth_header: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiBackend {
    pub fn new(config: &OpenAiConfig, api_key: Option<&str>) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout,
            cached_auth_header: api_key
                .filter(|k| !k.trim().is_empty())
                .map(|k| format!("Bearer {}", k.trim())),
            client: build_http_client(),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
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
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl ReasoningBackend for OpenAiBackend {
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
        let body = self.build_request(request);
        let mut builder = self.client.post(self.chat_completions_url()).json(&body);
        if let Some(auth) = &self.cached_auth_header {
            builder = builder.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = builder
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

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ReasoningError::EmptyReply)?;

        parse_reply(&content)
    }
}
