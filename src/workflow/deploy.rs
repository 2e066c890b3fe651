//! Configure and launch the agent on AgentCore.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::cloud::{
    default_repository_name, find_runtime, is_end_status, ContainerRegistry, ImageBuilder,
    RuntimeControl, RuntimeSpec,
};
use crate::project::{ProjectConfig, ProjectError, PROJECT_FILE};

/// AgentCore runs arm64 containers.
pub const DEFAULT_PLATFORM: &str = "linux/arm64";

/// Binary the container starts.
pub const RUNTIME_BINARY: &str = "agent-runtime";

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub agent_name: String,
    pub region: String,
    pub execution_role: String,
    pub platform: String,
    pub project_dir: PathBuf,
}

impl DeployOptions {
    pub fn project_file(&self) -> PathBuf {
        self.project_dir.join(PROJECT_FILE)
    }
}

/// Identifiers of the launched runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchResult {
    pub agent_id: String,
    pub agent_arn: String,
    pub ecr_uri: String,
    pub status: String,
    /// `false` when an existing runtime was updated
    pub created: bool,
}

/// Record the agent in the project file and write the container build files.
pub fn configure(opts: &DeployOptions) -> Result<ProjectConfig, ProjectError> {
    let path = opts.project_file();
    let mut project = ProjectConfig::load_optional(&path)?.unwrap_or_default();

    project.default_agent = Some(opts.agent_name.clone());
    let entry = project.agent_mut(&opts.agent_name);
    entry.name = Some(opts.agent_name.clone());
    entry.entrypoint = Some(RUNTIME_BINARY.to_string());
    entry.platform = Some(opts.platform.clone());
    entry.aws.region = Some(opts.region.clone());
    entry.aws.execution_role = Some(opts.execution_role.clone());
    entry.aws.account = account_from_role(&opts.execution_role);

    write_file(&opts.project_dir.join("Dockerfile"), &dockerfile(RUNTIME_BINARY))?;
    write_file(&opts.project_dir.join(".dockerignore"), DOCKERIGNORE)?;
    project.save(&path)?;

    tracing::info!(agent = %opts.agent_name, region = %opts.region, "Configured agent");
    Ok(project)
}

/// Push the image and create (or update) the runtime, then record its ids.
pub async fn launch(
    opts: &DeployOptions,
    project: &mut ProjectConfig,
    control: &dyn RuntimeControl,
    registry: &dyn ContainerRegistry,
    builder: &dyn ImageBuilder,
) -> anyhow::Result<LaunchResult> {
    let repository = default_repository_name(&opts.agent_name);
    let repository_uri = registry
        .ensure_repository(&repository)
        .await
        .context("preparing ECR repository")?;
    let image_uri = format!("{}:latest", repository_uri);

    let login = registry.login().await.context("fetching ECR credentials")?;
    builder
        .build_and_push(&opts.project_dir, &image_uri, &opts.platform, &login)
        .await
        .context("building and pushing the agent image")?;

    let spec = RuntimeSpec {
        name: opts.agent_name.clone(),
        container_uri: image_uri.clone(),
        role_arn: opts.execution_role.clone(),
    };

    let existing = control.list_runtimes().await?;
    let (summary, created) = match find_runtime(&existing, &opts.agent_name) {
        Some(runtime) => (control.update_runtime(&runtime.id, &spec).await?, false),
        None => (control.create_runtime(&spec).await?, true),
    };

    let entry = project.agent_mut(&opts.agent_name);
    entry.aws.ecr_repository = Some(repository_uri.clone());
    entry.bedrock_agentcore.agent_id = Some(summary.id.clone());
    entry.bedrock_agentcore.agent_arn = Some(summary.arn.clone());
    project.save(&opts.project_file())?;

    Ok(LaunchResult {
        agent_id: summary.id,
        agent_arn: summary.arn,
        ecr_uri: image_uri,
        status: summary.status,
        created,
    })
}

/// Poll until the runtime reaches an end status.
pub async fn wait_until_ready(
    control: &dyn RuntimeControl,
    agent_id: &str,
    interval: Duration,
    max_polls: usize,
) -> anyhow::Result<String> {
    for _ in 0..max_polls {
        let status = control.get_runtime(agent_id).await?.summary.status;
        tracing::info!(agent_id, status = %status, "Runtime status");
        if is_end_status(&status) {
            return Ok(status);
        }
        tokio::time::sleep(interval).await;
    }

    anyhow::bail!(
        "Runtime {} did not reach an end status after {} polls",
        agent_id,
        max_polls
    )
}

const DOCKERIGNORE: &str = "target/\n.git/\n.bedrock_agentcore.yaml\n";

fn dockerfile(binary: &str) -> String {
    format!(
        r#"FROM rust:1-bookworm AS build
WORKDIR /app
COPY . .
RUN cargo build --release --bin {binary}

FROM debian:bookworm-slim
RUN apt-get update && apt-get install -y --no-install-recommends ca-certificates \
    && rm -rf /var/lib/apt/lists/*
COPY --from=build /app/target/release/{binary} /usr/local/bin/{binary}
ENV HOST=0.0.0.0 PORT=8080
EXPOSE 8080
CMD ["{binary}"]
"#
    )
}

/// `arn:aws:iam::123456789012:role/name` -> `123456789012`
fn account_from_role(role_arn: &str) -> Option<String> {
    role_arn
        .split(':')
        .nth(4)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ProjectError> {
    std::fs::write(path, contents).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}
