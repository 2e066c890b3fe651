//! Configuration management for the agent runtime.
//!
//! Configuration can be set via environment variables:
//! - `MODEL_ID` - Optional. Bedrock model identifier. Defaults to Claude 3.7 Sonnet (US inference profile).
//! - `AWS_REGION` - Optional. Region for Bedrock calls. Falls back to the AWS SDK provider chain.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `8080`, the port AgentCore routes to.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `20`.
//! - `SYSTEM_PROMPT` - Optional. Overrides the default system prompt.
//! - `SEARCH_MAX_RESULTS` - Optional. Default result count for `web_search`. Defaults to `5`.

use thiserror::Error;

pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-3-7-sonnet-20250219-v1:0";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You're a helpful assistant.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bedrock model identifier or inference profile
    pub model_id: String,

    /// Region override for Bedrock calls
    pub region: Option<String>,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    /// Base system prompt (tool descriptions are appended)
    pub system_prompt: String,

    /// Default number of web search results
    pub search_max_results: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let model_id =
            std::env::var("MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());

        let region = std::env::var("AWS_REGION")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = parse_var("PORT", "8080")?;
        let max_iterations = parse_var("MAX_ITERATIONS", "20")?;
        let search_max_results = parse_var("SEARCH_MAX_RESULTS", "5")?;

        let system_prompt = std::env::var("SYSTEM_PROMPT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Self {
            model_id,
            region,
            host,
            port,
            max_iterations,
            system_prompt,
            search_max_results,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            region: None,
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_iterations: 20,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            search_max_results: 5,
        }
    }
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_runtime_defaults() {
        let config = Config::new("model-x");
        assert_eq!(config.model_id, "model-x");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn parse_var_reports_bad_numbers() {
        std::env::set_var("AGENTCORE_TEST_BAD_PORT", "eighty");
        let err = parse_var::<u16>("AGENTCORE_TEST_BAD_PORT", "8080").unwrap_err();
        std::env::remove_var("AGENTCORE_TEST_BAD_PORT");
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "AGENTCORE_TEST_BAD_PORT"));
    }

    #[test]
    fn parse_var_falls_back_to_default() {
        let value: usize = parse_var("AGENTCORE_TEST_UNSET_VAR", "7").unwrap();
        assert_eq!(value, 7);
    }
}
