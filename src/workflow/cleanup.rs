//! Tear down a deployed agent and verify nothing is left behind.

use std::path::Path;
use std::time::Duration;

use crate::cloud::{
    default_repository_name, find_runtime, repository_name_from_uri, ContainerRegistry,
    RuntimeControl, RuntimeSummary,
};
use crate::project::{remove_local_artifacts, ResolvedAgent};

/// What happened to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeOutcome {
    /// No runtime with the agent's name (may already be deleted)
    NotFound,
    Deleted { id: String, status: String },
}

/// What happened to the image repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOutcome {
    pub name: String,
    /// Repository ARN, or the error message
    pub result: Result<String, String>,
}

#[derive(Debug, Clone)]
pub struct CleanupReport {
    pub agent_name: String,
    pub runtime: RuntimeOutcome,
    pub repository: Option<RepositoryOutcome>,
    pub local_files: Vec<String>,
}

#[derive(Debug)]
pub struct VerifyReport {
    pub runtimes: Result<Vec<RuntimeSummary>, String>,
    pub repositories: Result<Vec<String>, String>,
}

/// Delete the agent's runtime and repository, then the local artifacts.
///
/// A failure to list runtimes aborts before anything is deleted. Repository
/// errors are recorded in the report and do not stop the cleanup.
pub async fn cleanup_agent(
    agent: &ResolvedAgent,
    project_dir: &Path,
    control: &dyn RuntimeControl,
    registry: &dyn ContainerRegistry,
    settle: Duration,
) -> anyhow::Result<CleanupReport> {
    let runtimes = control.list_runtimes().await?;

    let (runtime, repository) = match find_runtime(&runtimes, &agent.name) {
        None => {
            tracing::info!(agent = %agent.name, "Agent runtime not found");
            (RuntimeOutcome::NotFound, None)
        }
        Some(found) => {
            let container_uri = match control.get_runtime(&found.id).await {
                Ok(details) => details.container_uri,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not read runtime artifact");
                    None
                }
            };

            let status = control.delete_runtime(&found.id).await?;
            tracing::info!(id = %found.id, "Waiting for runtime deletion");
            tokio::time::sleep(settle).await;

            let name = container_uri
                .as_deref()
                .and_then(repository_name_from_uri)
                .unwrap_or_else(|| default_repository_name(&agent.name));
            let result = registry
                .delete_repository(&name)
                .await
                .map_err(|e| e.to_string());

            (
                RuntimeOutcome::Deleted {
                    id: found.id.clone(),
                    status,
                },
                Some(RepositoryOutcome { name, result }),
            )
        }
    };

    let local_files = remove_local_artifacts(project_dir)?;

    Ok(CleanupReport {
        agent_name: agent.name.clone(),
        runtime,
        repository,
        local_files,
    })
}

/// List whatever runtimes and agent repositories remain.
pub async fn verify_cleanup(
    control: &dyn RuntimeControl,
    registry: &dyn ContainerRegistry,
) -> VerifyReport {
    VerifyReport {
        runtimes: control.list_runtimes().await.map_err(|e| e.to_string()),
        repositories: registry.list_repositories().await.map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::fakes::{FakeControl, FakeRegistry};
    use crate::project::PROJECT_FILE;

    fn resolved(name: &str) -> ResolvedAgent {
        ResolvedAgent {
            key: name.to_string(),
            name: name.to_string(),
            region: "us-west-2".to_string(),
            agent_id: None,
            agent_arn: None,
        }
    }

    #[tokio::test]
    async fn deletes_runtime_repository_and_local_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_FILE), "default_agent: a\n").unwrap();
        std::fs::write(dir.path().join(".dockerignore"), "target/\n").unwrap();

        let control = FakeControl::with_runtime(
            "a",
            Some("123456789012.dkr.ecr.us-west-2.amazonaws.com/custom-repo:v3"),
        );
        let registry = FakeRegistry::with_repositories(&["custom-repo"]);

        let report = cleanup_agent(&resolved("a"), dir.path(), &control, &registry, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(
            report.runtime,
            RuntimeOutcome::Deleted {
                id: "a-id".to_string(),
                status: "DELETING".to_string()
            }
        );
        let repo = report.repository.unwrap();
        assert_eq!(repo.name, "custom-repo");
        assert!(repo.result.is_ok());
        assert_eq!(report.local_files, vec![PROJECT_FILE, ".dockerignore"]);
        assert!(control.runtimes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_default_repository_name() {
        let dir = tempfile::tempdir().unwrap();
        let control = FakeControl::with_runtime("a", None);
        let registry = FakeRegistry::with_repositories(&["bedrock-agentcore-a"]);

        let report = cleanup_agent(&resolved("a"), dir.path(), &control, &registry, Duration::ZERO)
            .await
            .unwrap();

        let repo = report.repository.unwrap();
        assert_eq!(repo.name, "bedrock-agentcore-a");
        assert_eq!(
            registry.deleted.lock().unwrap().as_slice(),
            ["bedrock-agentcore-a".to_string()]
        );
    }

    #[tokio::test]
    async fn repository_errors_do_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Dockerfile"), "FROM scratch\n").unwrap();
        let control = FakeControl::with_runtime("a", None);
        let registry = FakeRegistry::default();

        let report = cleanup_agent(&resolved("a"), dir.path(), &control, &registry, Duration::ZERO)
            .await
            .unwrap();

        assert!(report.repository.unwrap().result.is_err());
        assert_eq!(report.local_files, vec!["Dockerfile"]);
    }

    #[tokio::test]
    async fn missing_runtime_skips_registry() {
        let dir = tempfile::tempdir().unwrap();
        let control = FakeControl::default();
        let registry = FakeRegistry::with_repositories(&["bedrock-agentcore-a"]);

        let report = cleanup_agent(&resolved("a"), dir.path(), &control, &registry, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(report.runtime, RuntimeOutcome::NotFound);
        assert!(report.repository.is_none());
        assert!(registry.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_failure_aborts_before_deleting_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_FILE), "default_agent: a\n").unwrap();
        let control = FakeControl {
            fail_list: true,
            ..Default::default()
        };

        let result = cleanup_agent(
            &resolved("a"),
            dir.path(),
            &control,
            &FakeRegistry::default(),
            Duration::ZERO,
        )
        .await;

        assert!(result.is_err());
        assert!(dir.path().join(PROJECT_FILE).exists());
    }

    #[tokio::test]
    async fn verify_lists_survivors() {
        let control = FakeControl::with_runtime("left_over", None);
        let registry = FakeRegistry::with_repositories(&["bedrock-agentcore-x", "unrelated"]);

        let report = verify_cleanup(&control, &registry).await;
        assert_eq!(report.runtimes.unwrap()[0].name, "left_over");
        assert_eq!(report.repositories.unwrap(), vec!["bedrock-agentcore-x"]);
    }
}
