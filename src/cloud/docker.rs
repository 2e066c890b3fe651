//! Image build and push through the local `docker` CLI.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{CloudError, ImageBuilder, RegistryLogin};

/// Shells out to `docker` (buildx for cross-platform builds).
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    pub fn new() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }

    async fn run(&self, step: &'static str, args: &[&str], cwd: &Path) -> Result<(), CloudError> {
        tracing::info!("Running: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(CloudError::Docker {
                step,
                message: tail(&String::from_utf8_lossy(&output.stderr), 2000),
            });
        }
        Ok(())
    }

    async fn login(&self, login: &RegistryLogin) -> Result<(), CloudError> {
        let mut child = Command::new(&self.program)
            .args([
                "login",
                "--username",
                login.username.as_str(),
                "--password-stdin",
                login.endpoint.as_str(),
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(login.password.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(CloudError::Docker {
                step: "login",
                message: tail(&String::from_utf8_lossy(&output.stderr), 2000),
            });
        }
        Ok(())
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageBuilder for DockerCli {
    async fn build_and_push(
        &self,
        context_dir: &Path,
        image_uri: &str,
        platform: &str,
        login: &RegistryLogin,
    ) -> Result<(), CloudError> {
        self.login(login).await?;
        self.run(
            "build",
            &["buildx", "build", "--platform", platform, "-t", image_uri, "--load", "."],
            context_dir,
        )
        .await?;
        self.run("push", &["push", image_uri], context_dir).await?;
        Ok(())
    }
}

/// Keep the last `max_len` bytes of command output.
fn tail(s: &str, max_len: usize) -> String {
    let s = s.trim();
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut start = s.len() - max_len;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    format!("... {}", &s[start..])
}
