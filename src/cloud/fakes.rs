//! In-memory service fakes for workflow tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use super::{
    CloudError, ContainerRegistry, ImageBuilder, InvokeOutput, RegistryLogin, RuntimeControl,
    RuntimeDetails, RuntimeInvoker, RuntimeSpec, RuntimeSummary,
};

#[derive(Default)]
pub(crate) struct FakeControl {
    pub runtimes: Mutex<Vec<RuntimeDetails>>,
    /// Statuses handed out by successive `get_runtime` calls.
    pub status_script: Mutex<VecDeque<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub updated: Mutex<Vec<String>>,
    pub fail_list: bool,
}

impl FakeControl {
    pub fn with_runtime(name: &str, container_uri: Option<&str>) -> Self {
        let fake = Self::default();
        fake.runtimes.lock().unwrap().push(RuntimeDetails {
            summary: RuntimeSummary {
                id: format!("{name}-id"),
                arn: format!("arn:aws:bedrock-agentcore:us-west-2:123456789012:runtime/{name}-id"),
                name: name.to_string(),
                status: "READY".to_string(),
            },
            container_uri: container_uri.map(str::to_string),
        });
        fake
    }
}

#[async_trait]
impl RuntimeControl for FakeControl {
    async fn list_runtimes(&self) -> Result<Vec<RuntimeSummary>, CloudError> {
        if self.fail_list {
            return Err(CloudError::sdk("ListAgentRuntimes", "access denied"));
        }
        Ok(self
            .runtimes
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.summary.clone())
            .collect())
    }

    async fn get_runtime(&self, id: &str) -> Result<RuntimeDetails, CloudError> {
        let mut details = self
            .runtimes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.summary.id == id)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(id.to_string()))?;
        if let Some(status) = self.status_script.lock().unwrap().pop_front() {
            details.summary.status = status;
        }
        Ok(details)
    }

    async fn create_runtime(&self, spec: &RuntimeSpec) -> Result<RuntimeSummary, CloudError> {
        let summary = RuntimeSummary {
            id: format!("{}-id", spec.name),
            arn: format!("arn:runtime/{}-id", spec.name),
            name: spec.name.clone(),
            status: "CREATING".to_string(),
        };
        self.runtimes.lock().unwrap().push(RuntimeDetails {
            summary: summary.clone(),
            container_uri: Some(spec.container_uri.clone()),
        });
        Ok(summary)
    }

    async fn update_runtime(
        &self,
        id: &str,
        spec: &RuntimeSpec,
    ) -> Result<RuntimeSummary, CloudError> {
        self.updated.lock().unwrap().push(id.to_string());
        let mut runtimes = self.runtimes.lock().unwrap();
        let existing = runtimes
            .iter_mut()
            .find(|r| r.summary.id == id)
            .ok_or_else(|| CloudError::NotFound(id.to_string()))?;
        existing.container_uri = Some(spec.container_uri.clone());
        existing.summary.status = "UPDATING".to_string();
        Ok(existing.summary.clone())
    }

    async fn delete_runtime(&self, id: &str) -> Result<String, CloudError> {
        self.deleted.lock().unwrap().push(id.to_string());
        self.runtimes.lock().unwrap().retain(|r| r.summary.id != id);
        Ok("DELETING".to_string())
    }
}

#[derive(Default)]
pub(crate) struct FakeRegistry {
    pub repositories: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn with_repositories(names: &[&str]) -> Self {
        let fake = Self::default();
        fake.repositories
            .lock()
            .unwrap()
            .extend(names.iter().map(|n| n.to_string()));
        fake
    }
}

#[async_trait]
impl ContainerRegistry for FakeRegistry {
    async fn ensure_repository(&self, name: &str) -> Result<String, CloudError> {
        let mut repos = self.repositories.lock().unwrap();
        if !repos.iter().any(|r| r == name) {
            repos.push(name.to_string());
        }
        Ok(format!("123456789012.dkr.ecr.us-west-2.amazonaws.com/{name}"))
    }

    async fn delete_repository(&self, name: &str) -> Result<String, CloudError> {
        let mut repos = self.repositories.lock().unwrap();
        let before = repos.len();
        repos.retain(|r| r != name);
        if repos.len() == before {
            return Err(CloudError::NotFound(format!("ECR repository {name}")));
        }
        self.deleted.lock().unwrap().push(name.to_string());
        Ok(format!("arn:aws:ecr:us-west-2:123456789012:repository/{name}"))
    }

    async fn list_repositories(&self) -> Result<Vec<String>, CloudError> {
        Ok(self
            .repositories
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.contains(super::REPOSITORY_PREFIX))
            .cloned()
            .collect())
    }

    async fn login(&self) -> Result<RegistryLogin, CloudError> {
        Ok(RegistryLogin {
            username: "AWS".to_string(),
            password: "pw".to_string(),
            endpoint: "https://123456789012.dkr.ecr.us-west-2.amazonaws.com".to_string(),
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeBuilder {
    pub pushed: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ImageBuilder for FakeBuilder {
    async fn build_and_push(
        &self,
        _context_dir: &Path,
        image_uri: &str,
        platform: &str,
        _login: &RegistryLogin,
    ) -> Result<(), CloudError> {
        self.pushed
            .lock()
            .unwrap()
            .push((image_uri.to_string(), platform.to_string()));
        Ok(())
    }
}

pub(crate) struct FakeInvoker {
    pub output: InvokeOutput,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl FakeInvoker {
    pub fn replying(content_type: &str, body: &str) -> Self {
        Self {
            output: InvokeOutput {
                content_type: content_type.to_string(),
                body: Bytes::from(body.to_string()),
            },
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RuntimeInvoker for FakeInvoker {
    async fn invoke(&self, runtime_arn: &str, payload: &Value) -> Result<InvokeOutput, CloudError> {
        self.calls
            .lock()
            .unwrap()
            .push((runtime_arn.to_string(), payload.clone()));
        Ok(self.output.clone())
    }
}
