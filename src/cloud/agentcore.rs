//! AgentCore control and data plane clients.

use async_trait::async_trait;
use aws_sdk_bedrockagentcore::primitives::Blob;
use aws_sdk_bedrockagentcorecontrol::error::{DisplayErrorContext, SdkError};
use aws_sdk_bedrockagentcorecontrol::types::{
    AgentRuntimeArtifact, ContainerConfiguration, NetworkConfiguration, NetworkMode,
};
use serde_json::Value;
use tracing::{debug, info};

use super::{
    CloudError, InvokeOutput, RuntimeControl, RuntimeDetails, RuntimeInvoker, RuntimeSpec,
    RuntimeSummary,
};

/// Endpoint qualifier used for every invocation.
const DEFAULT_QUALIFIER: &str = "DEFAULT";

/// Control plane (`bedrock-agentcore-control`).
pub struct AgentCoreControl {
    client: aws_sdk_bedrockagentcorecontrol::Client,
}

impl AgentCoreControl {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockagentcorecontrol::Client::new(sdk_config),
        }
    }
}

fn control_error<E, R>(operation: &'static str) -> impl FnOnce(SdkError<E, R>) -> CloudError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    move |e| CloudError::sdk(operation, DisplayErrorContext(&e))
}

fn artifact(spec: &RuntimeSpec) -> Result<AgentRuntimeArtifact, CloudError> {
    let container = ContainerConfiguration::builder()
        .container_uri(&spec.container_uri)
        .build()
        .map_err(|e| CloudError::InvalidRequest(e.to_string()))?;
    Ok(AgentRuntimeArtifact::ContainerConfiguration(container))
}

fn public_network() -> Result<NetworkConfiguration, CloudError> {
    NetworkConfiguration::builder()
        .network_mode(NetworkMode::Public)
        .build()
        .map_err(|e| CloudError::InvalidRequest(e.to_string()))
}

#[async_trait]
impl RuntimeControl for AgentCoreControl {
    async fn list_runtimes(&self) -> Result<Vec<RuntimeSummary>, CloudError> {
        let mut runtimes = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_agent_runtimes()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(control_error("ListAgentRuntimes"))?;

            runtimes.extend(page.agent_runtimes().iter().map(|r| RuntimeSummary {
                id: r.agent_runtime_id().to_string(),
                arn: r.agent_runtime_arn().to_string(),
                name: r.agent_runtime_name().to_string(),
                status: r.status().as_str().to_string(),
            }));

            match page.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(count = runtimes.len(), "Listed agent runtimes");
        Ok(runtimes)
    }

    async fn get_runtime(&self, id: &str) -> Result<RuntimeDetails, CloudError> {
        let out = self
            .client
            .get_agent_runtime()
            .agent_runtime_id(id)
            .send()
            .await
            .map_err(control_error("GetAgentRuntime"))?;

        let container_uri = out
            .agent_runtime_artifact()
            .and_then(|a| a.as_container_configuration().ok())
            .map(|c| c.container_uri().to_string())
            .filter(|uri| !uri.is_empty());

        Ok(RuntimeDetails {
            summary: RuntimeSummary {
                id: out.agent_runtime_id().to_string(),
                arn: out.agent_runtime_arn().to_string(),
                name: out.agent_runtime_name().to_string(),
                status: out.status().as_str().to_string(),
            },
            container_uri,
        })
    }

    async fn create_runtime(&self, spec: &RuntimeSpec) -> Result<RuntimeSummary, CloudError> {
        let out = self
            .client
            .create_agent_runtime()
            .agent_runtime_name(&spec.name)
            .agent_runtime_artifact(artifact(spec)?)
            .role_arn(&spec.role_arn)
            .network_configuration(public_network()?)
            .send()
            .await
            .map_err(control_error("CreateAgentRuntime"))?;

        info!(name = %spec.name, id = out.agent_runtime_id(), "Created agent runtime");

        Ok(RuntimeSummary {
            id: out.agent_runtime_id().to_string(),
            arn: out.agent_runtime_arn().to_string(),
            name: spec.name.clone(),
            status: out.status().as_str().to_string(),
        })
    }

    async fn update_runtime(
        &self,
        id: &str,
        spec: &RuntimeSpec,
    ) -> Result<RuntimeSummary, CloudError> {
        let out = self
            .client
            .update_agent_runtime()
            .agent_runtime_id(id)
            .agent_runtime_artifact(artifact(spec)?)
            .role_arn(&spec.role_arn)
            .network_configuration(public_network()?)
            .send()
            .await
            .map_err(control_error("UpdateAgentRuntime"))?;

        info!(name = %spec.name, id, "Updated agent runtime");

        Ok(RuntimeSummary {
            id: out.agent_runtime_id().to_string(),
            arn: out.agent_runtime_arn().to_string(),
            name: spec.name.clone(),
            status: out.status().as_str().to_string(),
        })
    }

    async fn delete_runtime(&self, id: &str) -> Result<String, CloudError> {
        let out = self
            .client
            .delete_agent_runtime()
            .agent_runtime_id(id)
            .send()
            .await
            .map_err(control_error("DeleteAgentRuntime"))?;

        info!(id, "Agent runtime deletion initiated");
        Ok(out.status().as_str().to_string())
    }
}

/// Data plane (`bedrock-agentcore`).
pub struct AgentCoreData {
    client: aws_sdk_bedrockagentcore::Client,
}

impl AgentCoreData {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockagentcore::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl RuntimeInvoker for AgentCoreData {
    async fn invoke(&self, runtime_arn: &str, payload: &Value) -> Result<InvokeOutput, CloudError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| CloudError::InvalidRequest(e.to_string()))?;
        let session_id = uuid::Uuid::new_v4().to_string();

        debug!(runtime_arn, session_id = %session_id, "Invoking agent runtime");

        let out = self
            .client
            .invoke_agent_runtime()
            .agent_runtime_arn(runtime_arn)
            .qualifier(DEFAULT_QUALIFIER)
            .runtime_session_id(session_id)
            .content_type("application/json")
            .payload(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                CloudError::sdk(
                    "InvokeAgentRuntime",
                    aws_sdk_bedrockagentcore::error::DisplayErrorContext(&e),
                )
            })?;

        let content_type = out.content_type().to_string();
        let body = out
            .response
            .collect()
            .await
            .map_err(|e| CloudError::sdk("InvokeAgentRuntime (read body)", e))?
            .into_bytes();

        Ok(InvokeOutput { content_type, body })
    }
}
