//! # AgentCore Agent
//!
//! A tool-using LLM agent packaged for the Amazon Bedrock AgentCore runtime.
//!
//! This library provides:
//! - A small set of tools (calculator, currency conversion, weather, web search, clock)
//! - An agent that relays model tool calls through the Bedrock Converse API
//! - The runtime HTTP contract (`POST /invocations`, `GET /ping`)
//! - Deploy, invoke and cleanup workflows against the AgentCore control plane
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive a `{"prompt": ...}` payload
//! 2. Send the prompt, system prompt and tool schemas to the model
//! 3. Execute any tool calls the model requests and feed results back
//! 4. Return the model's final message once it stops asking for tools
//!
//! ## Example
//!
//! ```rust,ignore
//! use agentcore_agent::{agent::Agent, config::Config, entrypoint};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::from_config(&config).await?;
//! let payload = entrypoint::parse_payload(r#"{"prompt": "What is 2+2?"}"#)?;
//! let reply = entrypoint::handle_payload(&agent, &payload).await?;
//! ```

pub mod agent;
pub mod api;
pub mod cloud;
pub mod config;
pub mod entrypoint;
pub mod llm;
pub mod project;
pub mod telemetry;
pub mod tools;
pub mod workflow;

pub use config::Config;
