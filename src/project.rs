//! The local project file shared by the deploy, invoke and cleanup tools.
//!
//! `.bedrock_agentcore.yaml` names a default agent and, per agent, its
//! region and the identifiers of the deployed runtime. Fields this crate
//! does not use are ignored when reading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PROJECT_FILE: &str = ".bedrock_agentcore.yaml";

/// Files the deploy step writes next to the project.
pub const LOCAL_ARTIFACTS: [&str; 4] = [
    PROJECT_FILE,
    "Dockerfile",
    ".dockerignore",
    "agent_config.json",
];

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("No {} found at {}. Deploy your agent first.", PROJECT_FILE, .0.display())]
    NotFound(PathBuf),

    #[error("No default_agent specified in config")]
    NoDefaultAgent,

    #[error("No AWS region configured for agent '{0}'; set aws.region or AWS_REGION")]
    NoRegion(String),

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid project file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_agent: Option<String>,

    #[serde(default)]
    pub agents: BTreeMap<String, AgentEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default)]
    pub aws: AwsEntry,

    #[serde(default)]
    pub bedrock_agentcore: RuntimeEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecr_repository: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_arn: Option<String>,
}

/// The default agent with its name and region filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAgent {
    /// Key under `agents`
    pub key: String,
    pub name: String,
    pub region: String,
    pub agent_id: Option<String>,
    pub agent_arn: Option<String>,
}

impl ProjectConfig {
    /// Read the project file.
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        if !path.exists() {
            return Err(ProjectError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Read the project file, or `None` when it does not exist.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, ProjectError> {
        match Self::load(path) {
            Ok(config) => Ok(Some(config)),
            Err(ProjectError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ProjectError> {
        // An empty file parses as YAML null.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the default agent. The name falls back to the map key and the
    /// region to `fallback_region`.
    pub fn resolve_default(&self, fallback_region: &str) -> Result<ResolvedAgent, ProjectError> {
        self.resolve_default_in(Some(fallback_region))
    }

    /// Like [`Self::resolve_default`], but the fallback may be absent. An
    /// agent left with no region (or an empty one) is an error.
    pub fn resolve_default_in(
        &self,
        fallback_region: Option<&str>,
    ) -> Result<ResolvedAgent, ProjectError> {
        let key = self
            .default_agent
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProjectError::NoDefaultAgent)?;

        let entry = self.agents.get(key).cloned().unwrap_or_default();

        let name = entry.name.unwrap_or_else(|| key.to_string());
        let region = entry
            .aws
            .region
            .or_else(|| fallback_region.map(str::to_string))
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ProjectError::NoRegion(name.clone()))?;

        Ok(ResolvedAgent {
            key: key.to_string(),
            name,
            region,
            agent_id: entry.bedrock_agentcore.agent_id,
            agent_arn: entry.bedrock_agentcore.agent_arn,
        })
    }

    /// Entry for `key`, created if missing.
    pub fn agent_mut(&mut self, key: &str) -> &mut AgentEntry {
        self.agents.entry(key.to_string()).or_default()
    }
}

/// Delete the local artifacts that exist under `dir`, returning their names.
pub fn remove_local_artifacts(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut removed = Vec::new();
    for name in LOCAL_ARTIFACTS {
        let path = dir.join(name);
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::debug!(path = %path.display(), "Removed local artifact");
            removed.push(name.to_string());
        }
    }
    Ok(removed)
}
