use super::traits::ReasoningResponse;
use crate::error::ReasoningError;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct StructuredReply {
    #[serde(default)]
    thought: String,
    #[serde(default)]
    reply: String,
}

/// Only a JSON object counts as structured output. Derived struct decoding
/// would also take a positional array, so the object is checked first.
fn decode_structured(raw: &str) -> Option<StructuredReply> {
    let object = serde_json::from_str::<Map<String, Value>>(raw).ok()?;
    serde_json::from_value(Value::Object(object)).ok()
}

/// Interpret a raw backend payload.
///
/// A JSON object with a non-empty `reply` is taken as-is. An object whose
/// `reply` is missing or blank keeps its `thought` and uses the raw payload
/// as reply. Anything else becomes the reply verbatim with an empty thought.
/// A blank payload is an error.
pub fn parse_reply(raw: &str) -> Result<ReasoningResponse, ReasoningError> {
    if raw.trim().is_empty() {
        return Err(ReasoningError::EmptyReply);
    }

    match decode_structured(raw.trim()) {
        Some(structured) if !structured.reply.trim().is_empty() => Ok(ReasoningResponse {
            thought: structured.thought,
            reply: structured.reply,
        }),
        Some(structured) => Ok(ReasoningResponse {
            thought: structured.thought,
            reply: raw.to_string(),
        }),
        None => Ok(ReasoningResponse {
            thought: String::new(),
            reply: raw.to_string(),
        }),
    }
}
