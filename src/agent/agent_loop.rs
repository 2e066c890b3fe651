//! Core agent loop implementation.

use std::sync::Arc;

use serde::Serialize;

use crate::api::types::{LogEntryType, TaskLogEntry};
use crate::config::Config;
use crate::llm::{BedrockModel, ChatMessage, LlmClient, Role, ToolCall};
use crate::tools::ToolRegistry;

/// One content block of the agent's final message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The agent's final message.
#[derive(Debug, Clone, Serialize)]
pub struct AgentMessage {
    pub role: Role,
    pub content: Vec<MessageContent>,
}

/// Outcome of a single invocation.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    pub message: AgentMessage,
    pub log: Vec<TaskLogEntry>,
    pub iterations: usize,
}

/// An LLM bound to a tool set and a system prompt.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    model_id: String,
    tools: ToolRegistry,
    system_prompt: String,
    max_iterations: usize,
}

impl Agent {
    /// Bind a model, tools and system prompt into an agent.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model_id: impl Into<String>,
        tools: ToolRegistry,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            model_id: model_id.into(),
            tools,
            system_prompt: system_prompt.into(),
            max_iterations: 20,
        }
    }

    /// The runtime agent: Bedrock model plus the default tool set.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = Arc::new(BedrockModel::new(config.region.clone()).await);
        let tools = ToolRegistry::with_defaults(config.search_max_results);

        tracing::info!(
            model = %config.model_id,
            tools = tools.len(),
            "Agent assembled"
        );

        Ok(Self::new(llm, &config.model_id, tools, &config.system_prompt)
            .with_max_iterations(config.max_iterations))
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one prompt to completion.
    pub async fn invoke(&self, prompt: &str) -> anyhow::Result<AgentResult> {
        let mut log = Vec::new();
        let mut messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(prompt),
        ];

        let tool_schemas = self.tools.get_tool_schemas();

        for iteration in 0..self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let response = self
                .llm
                .chat_completion(&self.model_id, &messages, Some(&tool_schemas))
                .await?;

            if let Some(tool_calls) = response.tool_calls.as_ref().filter(|c| !c.is_empty()) {
                messages.push(ChatMessage {
                    role: Role::Assistant,
                    content: response.content.clone(),
                    tool_calls: Some(tool_calls.clone()),
                    tool_call_id: None,
                });

                for tool_call in tool_calls {
                    log.push(log_entry(
                        LogEntryType::ToolCall,
                        format!(
                            "Calling tool: {} with args: {}",
                            tool_call.function.name, tool_call.function.arguments
                        ),
                    ));

                    let result_str = match self.execute_tool_call(tool_call).await {
                        Ok(output) => output,
                        Err(e) => format!("Error: {}", e),
                    };

                    log.push(log_entry(
                        LogEntryType::ToolResult,
                        truncate_for_log(&result_str, 1000),
                    ));

                    messages.push(ChatMessage::tool_result(&tool_call.id, result_str));
                }

                continue;
            }

            // No tool calls - this is the final message
            let content: Vec<MessageContent> = response
                .content
                .map(|text| MessageContent { text: Some(text) })
                .into_iter()
                .collect();

            if let Some(text) = content.first().and_then(|c| c.text.as_deref()) {
                log.push(log_entry(
                    LogEntryType::Response,
                    truncate_for_log(text, 2000),
                ));
            }

            return Ok(AgentResult {
                message: AgentMessage {
                    role: Role::Assistant,
                    content,
                },
                log,
                iterations: iteration + 1,
            });
        }

        Err(anyhow::anyhow!(
            "Max iterations ({}) reached without completion",
            self.max_iterations
        ))
    }

    async fn execute_tool_call(&self, tool_call: &ToolCall) -> anyhow::Result<String> {
        let args: serde_json::Value = serde_json::from_str(&tool_call.function.arguments)
            .unwrap_or(serde_json::Value::Null);

        self.tools.execute(&tool_call.function.name, args).await
    }
}

fn log_entry(entry_type: LogEntryType, content: String) -> TaskLogEntry {
    TaskLogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        entry_type,
        content,
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}
