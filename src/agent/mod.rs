//! Agent module - binds a model, tools and a system prompt.
//!
//! The system prompt is sent exactly as bound; tools reach the model only
//! through the request's tool configuration.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build context with system prompt and user prompt
//! 2. Call the model with available tools
//! 3. If the model requests tool calls, execute them and feed results back
//! 4. Repeat until the model produces a final message or max iterations reached

mod agent_loop;

pub use agent_loop::{Agent, AgentMessage, AgentResult, MessageContent};
