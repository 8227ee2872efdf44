//! Reasoning backends: turn a structured request into a `{thought, reply}` pair.

pub mod factory;
pub mod ollama;
pub mod openai;
pub mod parse;
pub mod prompt;
pub mod script;
pub mod traits;

pub use factory::{create_backend, resolve_api_key};
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use parse::parse_reply;
pub use script::ScriptBackend;
pub use traits::{HistoryEntry, ReasoningBackend, ReasoningRequest, ReasoningResponse};

use crate::error::ReasoningError;
use crate::utils::sanitize_api_error;

/// Build a sanitized status error from a failed HTTP response.
pub(crate) async fn status_error(backend: &str, response: reqwest::Response) -> ReasoningError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read backend error body>".to_string());
    ReasoningError::Status {
        backend: backend.to_string(),
        status,
        body: sanitize_api_error(&body),
    }
}

pub(crate) fn transport_error(backend: &str, err: &reqwest::Error) -> ReasoningError {
    ReasoningError::Transport {
        backend: backend.to_string(),
        message: sanitize_api_error(&err.to_string()),
    }
}
