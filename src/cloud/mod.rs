//! Seams over the AWS services the workflows drive.
//!
//! - [`RuntimeControl`]: AgentCore control plane (create/update/get/list/delete runtimes)
//! - [`RuntimeInvoker`]: AgentCore data plane (`InvokeAgentRuntime`)
//! - [`ContainerRegistry`]: ECR repositories and login tokens
//! - [`ImageBuilder`]: local container image build and push
//!
//! The workflows only see these traits, so they run against in-memory fakes
//! in tests.

mod agentcore;
mod docker;
mod ecr;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

pub use agentcore::{AgentCoreControl, AgentCoreData};
pub use docker::DockerCli;
pub use ecr::EcrRegistry;

/// Terminal states of a runtime.
pub const END_STATUSES: [&str; 4] = ["READY", "CREATE_FAILED", "DELETE_FAILED", "UPDATE_FAILED"];

/// Prefix of repositories created for agent images.
pub const REPOSITORY_PREFIX: &str = "bedrock-agentcore";

#[derive(Debug, Error)]
pub enum CloudError {
    #[error("{operation} failed: {message}")]
    Sdk {
        operation: &'static str,
        message: String,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Response missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("docker {step} failed: {message}")]
    Docker { step: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CloudError {
    pub(crate) fn sdk(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Sdk {
            operation,
            message: err.to_string(),
        }
    }
}

/// A runtime as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSummary {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub status: String,
}

/// A runtime with its container artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeDetails {
    pub summary: RuntimeSummary,
    pub container_uri: Option<String>,
}

/// What to run and with which role.
#[derive(Debug, Clone)]
pub struct RuntimeSpec {
    pub name: String,
    pub container_uri: String,
    pub role_arn: String,
}

/// Registry credentials for `docker login`.
#[derive(Debug, Clone)]
pub struct RegistryLogin {
    pub username: String,
    pub password: String,
    pub endpoint: String,
}

/// Raw invoke response.
#[derive(Debug, Clone)]
pub struct InvokeOutput {
    pub content_type: String,
    pub body: Bytes,
}

#[async_trait]
pub trait RuntimeControl: Send + Sync {
    async fn list_runtimes(&self) -> Result<Vec<RuntimeSummary>, CloudError>;

    async fn get_runtime(&self, id: &str) -> Result<RuntimeDetails, CloudError>;

    async fn create_runtime(&self, spec: &RuntimeSpec) -> Result<RuntimeSummary, CloudError>;

    async fn update_runtime(
        &self,
        id: &str,
        spec: &RuntimeSpec,
    ) -> Result<RuntimeSummary, CloudError>;

    /// Start deletion; returns the reported status.
    async fn delete_runtime(&self, id: &str) -> Result<String, CloudError>;
}

#[async_trait]
pub trait RuntimeInvoker: Send + Sync {
    async fn invoke(&self, runtime_arn: &str, payload: &Value) -> Result<InvokeOutput, CloudError>;
}

#[async_trait]
pub trait ContainerRegistry: Send + Sync {
    /// Repository URI, creating the repository when needed.
    async fn ensure_repository(&self, name: &str) -> Result<String, CloudError>;

    /// Force-delete a repository and its images; returns its ARN.
    async fn delete_repository(&self, name: &str) -> Result<String, CloudError>;

    async fn list_repositories(&self) -> Result<Vec<String>, CloudError>;

    async fn login(&self) -> Result<RegistryLogin, CloudError>;
}

#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build_and_push(
        &self,
        context_dir: &std::path::Path,
        image_uri: &str,
        platform: &str,
        login: &RegistryLogin,
    ) -> Result<(), CloudError>;
}

/// Shared AWS configuration for a region (or the provider chain's default).
pub async fn load_sdk_config(region: Option<String>) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region));
    }
    loader.load().await
}

/// Region the SDK resolved, if any.
pub fn sdk_region(config: &aws_config::SdkConfig) -> Option<String> {
    config.region().map(|r| r.as_ref().to_string())
}

/// Default repository name for an agent.
pub fn default_repository_name(agent_name: &str) -> String {
    format!("{}-{}", REPOSITORY_PREFIX, agent_name)
}

/// Repository name from an image URI such as
/// `123.dkr.ecr.us-west-2.amazonaws.com/bedrock-agentcore-x:latest`.
pub fn repository_name_from_uri(uri: &str) -> Option<String> {
    let path = uri.split('/').nth(1)?;
    let name = path.split(':').next()?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Find a runtime by exact name.
pub fn find_runtime<'a>(runtimes: &'a [RuntimeSummary], name: &str) -> Option<&'a RuntimeSummary> {
    runtimes.iter().find(|r| r.name == name)
}

pub fn is_end_status(status: &str) -> bool {
    END_STATUSES.contains(&status)
}

#[cfg(test)]
pub(crate) mod fakes;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_name_strips_registry_and_tag() {
        assert_eq!(
            repository_name_from_uri(
                "123456789012.dkr.ecr.us-west-2.amazonaws.com/bedrock-agentcore-my_agent:latest"
            )
            .as_deref(),
            Some("bedrock-agentcore-my_agent")
        );
        assert_eq!(
            repository_name_from_uri("123.dkr.ecr.us-east-1.amazonaws.com/repo").as_deref(),
            Some("repo")
        );
    }

    #[test]
    fn repository_name_needs_a_path() {
        assert_eq!(repository_name_from_uri(""), None);
        assert_eq!(repository_name_from_uri("no-slash"), None);
    }

    #[test]
    fn default_repository_uses_prefix() {
        assert_eq!(default_repository_name("demo"), "bedrock-agentcore-demo");
    }

    #[test]
    fn end_statuses() {
        assert!(is_end_status("READY"));
        assert!(is_end_status("UPDATE_FAILED"));
        assert!(!is_end_status("CREATING"));
    }
}
