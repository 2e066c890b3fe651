//! Payload in, reply text out.
//!
//! The runtime and the local CLI both receive `{"prompt": "..."}`, hand the
//! prompt to the agent unchanged, and return the text of the first content
//! block of the agent's final message.

use serde_json::Value;
use thiserror::Error;

use crate::agent::{Agent, AgentResult};

#[derive(Debug, Error)]
pub enum EntrypointError {
    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Payload must contain a string \"prompt\" field")]
    MissingPrompt,

    #[error("Agent response contained no text")]
    EmptyResponse,

    #[error("Agent invocation failed: {0}")]
    Agent(#[source] anyhow::Error),
}

/// Parse the raw JSON argument.
pub fn parse_payload(raw: &str) -> Result<Value, EntrypointError> {
    Ok(serde_json::from_str(raw)?)
}

/// The `prompt` field, exactly as sent.
pub fn extract_prompt(payload: &Value) -> Result<&str, EntrypointError> {
    payload
        .get("prompt")
        .and_then(Value::as_str)
        .ok_or(EntrypointError::MissingPrompt)
}

/// Text of the first content block.
pub fn extract_text(result: &AgentResult) -> Result<&str, EntrypointError> {
    result
        .message
        .content
        .first()
        .and_then(|block| block.text.as_deref())
        .ok_or(EntrypointError::EmptyResponse)
}

/// Invoke the agent with a payload.
pub async fn handle_payload(agent: &Agent, payload: &Value) -> Result<String, EntrypointError> {
    let prompt = extract_prompt(payload)?;
    tracing::info!(prompt_len = prompt.len(), "User input received");

    let result = agent.invoke(prompt).await.map_err(EntrypointError::Agent)?;
    extract_text(&result).map(str::to_string)
}
