//! Tools the agent can call.
//!
//! Each tool exposes a name, a description and a JSON schema for its
//! arguments. The model picks a tool by name; the registry dispatches it.

mod calculator;
mod currency;
mod time;
mod weather;
mod web;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::ToolDefinition;

pub use calculator::{evaluate, Calculator};
pub use currency::{convert_currency, ConvertCurrency, UNSUPPORTED_CURRENCY};
pub use time::{format_time_at, CurrentTime};
pub use weather::Weather;
pub use web::{
    format_results, web_search, DuckDuckGo, SearchBackend, SearchHit, WebSearch, NO_RESULTS,
};

/// A callable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Name and description of a registered tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Ordered collection of tools, looked up by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tool set bound by the runtime agent.
    pub fn with_defaults(search_max_results: usize) -> Self {
        let mut registry = Self::new();
        registry.register(Calculator);
        registry.register(Weather);
        registry.register(WebSearch::new(
            Arc::new(DuckDuckGo::new()),
            search_max_results,
        ));
        registry.register(ConvertCurrency);
        registry.register(CurrentTime);
        registry
    }

    /// Add a tool, replacing any existing tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Arc::new(tool));
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Schemas in the shape the model client expects.
    pub fn get_tool_schemas(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, args: Value) -> anyhow::Result<String> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;

        tracing::debug!(tool = name, "Executing tool");
        tool.execute(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_registry_binds_runtime_tools() {
        let registry = ToolRegistry::with_defaults(5);
        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "calculator",
                "weather",
                "web_search",
                "convert_currency",
                "current_time"
            ]
        );
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Weather);
        registry.register(Weather);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn execute_dispatches_by_name() {
        let registry = ToolRegistry::with_defaults(5);
        let out = registry.execute("weather", json!({})).await.unwrap();
        assert_eq!(out, "sunny");
    }

    #[tokio::test]
    async fn execute_rejects_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.execute("teleport", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("Unknown tool: teleport"));
    }

    #[test]
    fn schemas_are_objects() {
        let registry = ToolRegistry::with_defaults(5);
        for schema in registry.get_tool_schemas() {
            assert_eq!(schema.parameters["type"], "object", "{}", schema.name);
        }
    }
}
