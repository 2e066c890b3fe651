//! Amazon Bedrock client using the Converse API.
//!
//! Credentials come from the standard AWS provider chain (environment,
//! shared config, container role). Inside AgentCore that is the runtime's
//! execution role.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ConverseOutput, Message, SystemContentBlock, Tool,
    ToolConfiguration, ToolInputSchema, ToolResultBlock, ToolResultContentBlock,
    ToolSpecification, ToolUseBlock,
};
use aws_smithy_types::{Document, Number};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{ChatMessage, ChatResponse, FunctionCall, LlmClient, Role, ToolCall, ToolDefinition};

/// Bedrock Converse client.
pub struct BedrockModel {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockModel {
    /// Build a client, optionally pinning the region.
    pub async fn new(region: Option<String>) -> Self {
        let sdk_config = crate::cloud::load_sdk_config(region).await;
        Self::from_client(aws_sdk_bedrockruntime::Client::new(&sdk_config))
    }

    pub fn from_client(client: aws_sdk_bedrockruntime::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LlmClient for BedrockModel {
    #[instrument(skip_all, fields(model = %model))]
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> anyhow::Result<ChatResponse> {
        let (system, conversation) = to_converse_messages(messages)?;
        let tool_config = tools
            .filter(|t| !t.is_empty())
            .map(to_tool_config)
            .transpose()?;

        debug!(turns = conversation.len(), "Calling Bedrock converse");

        let response = self
            .client
            .converse()
            .model_id(model)
            .set_system(Some(system))
            .set_messages(Some(conversation))
            .set_tool_config(tool_config)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Bedrock converse failed for model {}: {}",
                    model,
                    aws_sdk_bedrockruntime::error::DisplayErrorContext(&e)
                )
            })?;

        let stop_reason = Some(response.stop_reason().as_str().to_string());
        let message = match response.output {
            Some(ConverseOutput::Message(message)) => message,
            _ => anyhow::bail!("Bedrock response missing output message for model {}", model),
        };

        let mut chat = from_converse_message(&message);
        chat.stop_reason = stop_reason;
        Ok(chat)
    }
}

/// Split out system prompts and convert the rest to Converse turns.
///
/// Consecutive tool results are merged into a single user turn, since the
/// Converse API requires user and assistant turns to alternate.
pub fn to_converse_messages(
    messages: &[ChatMessage],
) -> anyhow::Result<(Vec<SystemContentBlock>, Vec<Message>)> {
    let mut system = Vec::new();
    let mut turns = Vec::new();
    let mut pending_results: Vec<ContentBlock> = Vec::new();

    for msg in messages {
        if msg.role != Role::Tool && !pending_results.is_empty() {
            turns.push(build_message(
                ConversationRole::User,
                std::mem::take(&mut pending_results),
            )?);
        }

        match msg.role {
            Role::Tool => {
                let result = ToolResultBlock::builder()
                    .tool_use_id(msg.tool_call_id.clone().unwrap_or_default())
                    .content(ToolResultContentBlock::Text(
                        msg.content.clone().unwrap_or_default(),
                    ))
                    .build()?;
                pending_results.push(ContentBlock::ToolResult(result));
            }
            Role::System => {
                if let Some(text) = msg.content.as_deref().filter(|t| !t.is_empty()) {
                    system.push(SystemContentBlock::Text(text.to_string()));
                }
            }
            Role::User => {
                let text = msg.content.clone().unwrap_or_default();
                turns.push(build_message(
                    ConversationRole::User,
                    vec![ContentBlock::Text(text)],
                )?);
            }
            Role::Assistant => {
                let mut blocks = Vec::new();
                if let Some(text) = msg.content.as_deref().filter(|t| !t.is_empty()) {
                    blocks.push(ContentBlock::Text(text.to_string()));
                }
                for call in msg.tool_calls.iter().flatten() {
                    let input: Value = serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|_| Value::Object(Default::default()));
                    let tool_use = ToolUseBlock::builder()
                        .tool_use_id(&call.id)
                        .name(&call.function.name)
                        .input(json_to_document(&input))
                        .build()?;
                    blocks.push(ContentBlock::ToolUse(tool_use));
                }
                if !blocks.is_empty() {
                    turns.push(build_message(ConversationRole::Assistant, blocks)?);
                }
            }
        }
    }

    if !pending_results.is_empty() {
        turns.push(build_message(ConversationRole::User, pending_results)?);
    }

    Ok((system, turns))
}

fn build_message(role: ConversationRole, content: Vec<ContentBlock>) -> anyhow::Result<Message> {
    Ok(Message::builder()
        .role(role)
        .set_content(Some(content))
        .build()?)
}

fn to_tool_config(tools: &[ToolDefinition]) -> anyhow::Result<ToolConfiguration> {
    let specs = tools
        .iter()
        .map(|tool| -> anyhow::Result<Tool> {
            let spec = ToolSpecification::builder()
                .name(&tool.name)
                .description(&tool.description)
                .input_schema(ToolInputSchema::Json(json_to_document(&tool.parameters)))
                .build()?;
            Ok(Tool::ToolSpec(spec))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(ToolConfiguration::builder().set_tools(Some(specs)).build()?)
}

fn from_converse_message(message: &Message) -> ChatResponse {
    let mut text = Vec::new();
    let mut tool_calls = Vec::new();

    for block in message.content() {
        match block {
            ContentBlock::Text(t) if !t.is_empty() => text.push(t.clone()),
            ContentBlock::ToolUse(tool_use) => tool_calls.push(ToolCall {
                id: tool_use.tool_use_id().to_string(),
                function: FunctionCall {
                    name: tool_use.name().to_string(),
                    arguments: document_to_json(tool_use.input()).to_string(),
                },
            }),
            _ => {}
        }
    }

    ChatResponse {
        content: (!text.is_empty()).then(|| text.join("\n")),
        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
        stop_reason: None,
    }
}

/// Convert JSON into the SDK's document type.
pub fn json_to_document(value: &Value) -> Document {
    match value {
        Value::Null => Document::Null,
        Value::Bool(b) => Document::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(Number::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(Number::NegInt(i))
            } else {
                n.as_f64()
                    .map(|f| Document::Number(Number::Float(f)))
                    .unwrap_or(Document::Null)
            }
        }
        Value::String(s) => Document::String(s.clone()),
        Value::Array(items) => Document::Array(items.iter().map(json_to_document).collect()),
        Value::Object(map) => Document::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_document(v)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

/// Convert an SDK document back into JSON.
pub fn document_to_json(doc: &Document) -> Value {
    match doc {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Number(Number::PosInt(u)) => Value::from(*u),
        Document::Number(Number::NegInt(i)) => Value::from(*i),
        Document::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Document::String(s) => Value::String(s.clone()),
        Document::Array(items) => Value::Array(items.iter().map(document_to_json).collect()),
        Document::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), document_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assistant_with_calls(ids: &[&str]) -> ChatMessage {
        ChatMessage {
            role: Role::Assistant,
            content: Some("Let me check.".to_string()),
            tool_calls: Some(
                ids.iter()
                    .map(|id| ToolCall {
                        id: id.to_string(),
                        function: FunctionCall {
                            name: "weather".to_string(),
                            arguments: "{}".to_string(),
                        },
                    })
                    .collect(),
            ),
            tool_call_id: None,
        }
    }

    #[test]
    fn document_conversion_preserves_json() {
        let value = json!({
            "query": "rust",
            "max_results": 3,
            "offset": -2,
            "ratio": 0.5,
            "flags": [true, null]
        });
        assert_eq!(document_to_json(&json_to_document(&value)), value);
    }

    #[test]
    fn system_prompt_is_split_out() {
        let (system, turns) = to_converse_messages(&[
            ChatMessage::system("be nice"),
            ChatMessage::user("hi"),
        ])
        .unwrap();
        assert_eq!(system.len(), 1);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role(), &ConversationRole::User);
    }

    #[test]
    fn tool_results_merge_into_one_user_turn() {
        let (_, turns) = to_converse_messages(&[
            ChatMessage::user("weather twice?"),
            assistant_with_calls(&["a", "b"]),
            ChatMessage::tool_result("a", "sunny"),
            ChatMessage::tool_result("b", "sunny"),
        ])
        .unwrap();

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role(), &ConversationRole::Assistant);
        assert_eq!(turns[1].content().len(), 3);
        assert_eq!(turns[2].role(), &ConversationRole::User);
        assert_eq!(turns[2].content().len(), 2);
        assert!(turns[2]
            .content()
            .iter()
            .all(|b| matches!(b, ContentBlock::ToolResult(_))));
    }

    #[test]
    fn reads_text_and_tool_use_from_reply() {
        let message = build_message(
            ConversationRole::Assistant,
            vec![
                ContentBlock::Text("Checking".to_string()),
                ContentBlock::ToolUse(
                    ToolUseBlock::builder()
                        .tool_use_id("t1")
                        .name("convert_currency")
                        .input(json_to_document(&json!({"amount": 5})))
                        .build()
                        .unwrap(),
                ),
            ],
        )
        .unwrap();

        let chat = from_converse_message(&message);
        assert_eq!(chat.content.as_deref(), Some("Checking"));
        let calls = chat.tool_calls.unwrap();
        assert_eq!(calls[0].id, "t1");
        assert_eq!(calls[0].function.name, "convert_currency");
        assert_eq!(calls[0].function.arguments, r#"{"amount":5}"#);
    }
}
