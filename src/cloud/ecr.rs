//! ECR repositories for agent images.

use async_trait::async_trait;
use aws_sdk_ecr::error::DisplayErrorContext;
use base64::Engine;
use tracing::info;

use super::{CloudError, ContainerRegistry, RegistryLogin, REPOSITORY_PREFIX};

pub struct EcrRegistry {
    client: aws_sdk_ecr::Client,
}

impl EcrRegistry {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ecr::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ContainerRegistry for EcrRegistry {
    async fn ensure_repository(&self, name: &str) -> Result<String, CloudError> {
        match self
            .client
            .describe_repositories()
            .repository_names(name)
            .send()
            .await
        {
            Ok(out) => {
                if let Some(uri) = out.repositories().first().and_then(|r| r.repository_uri()) {
                    return Ok(uri.to_string());
                }
            }
            Err(e) => {
                let not_found = e
                    .as_service_error()
                    .map(|se| se.is_repository_not_found_exception())
                    .unwrap_or(false);
                if !not_found {
                    return Err(CloudError::sdk(
                        "DescribeRepositories",
                        DisplayErrorContext(&e),
                    ));
                }
            }
        }

        let out = self
            .client
            .create_repository()
            .repository_name(name)
            .send()
            .await
            .map_err(|e| CloudError::sdk("CreateRepository", DisplayErrorContext(&e)))?;

        let uri = out
            .repository()
            .and_then(|r| r.repository_uri())
            .ok_or(CloudError::MissingField("repository.repositoryUri"))?;

        info!(repository = name, "Created ECR repository");
        Ok(uri.to_string())
    }

    async fn delete_repository(&self, name: &str) -> Result<String, CloudError> {
        let out = self
            .client
            .delete_repository()
            .repository_name(name)
            .force(true)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .map(|se| se.is_repository_not_found_exception())
                    .unwrap_or(false);
                if not_found {
                    CloudError::NotFound(format!("ECR repository {}", name))
                } else {
                    CloudError::sdk("DeleteRepository", DisplayErrorContext(&e))
                }
            })?;

        info!(repository = name, "Deleted ECR repository");
        Ok(out
            .repository()
            .and_then(|r| r.repository_arn())
            .unwrap_or_default()
            .to_string())
    }

    /// Repositories whose name contains the agent prefix.
    async fn list_repositories(&self) -> Result<Vec<String>, CloudError> {
        let mut names = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .client
                .describe_repositories()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| CloudError::sdk("DescribeRepositories", DisplayErrorContext(&e)))?;

            names.extend(
                page.repositories()
                    .iter()
                    .filter_map(|r| r.repository_name())
                    .filter(|n| n.contains(REPOSITORY_PREFIX))
                    .map(str::to_string),
            );

            match page.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(names)
    }

    async fn login(&self) -> Result<RegistryLogin, CloudError> {
        let out = self
            .client
            .get_authorization_token()
            .send()
            .await
            .map_err(|e| CloudError::sdk("GetAuthorizationToken", DisplayErrorContext(&e)))?;

        let data = out
            .authorization_data()
            .first()
            .ok_or(CloudError::MissingField("authorizationData"))?;
        let token = data
            .authorization_token()
            .ok_or(CloudError::MissingField("authorizationToken"))?;
        let endpoint = data
            .proxy_endpoint()
            .ok_or(CloudError::MissingField("proxyEndpoint"))?;

        decode_authorization_token(token, endpoint)
    }
}

/// ECR tokens are base64 of `user:password`.
fn decode_authorization_token(token: &str, endpoint: &str) -> Result<RegistryLogin, CloudError> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(token)
        .map_err(|e| CloudError::InvalidRequest(format!("bad authorization token: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| CloudError::InvalidRequest(format!("bad authorization token: {}", e)))?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| CloudError::InvalidRequest("authorization token has no ':'".to_string()))?;

    Ok(RegistryLogin {
        username: username.to_string(),
        password: password.to_string(),
        endpoint: endpoint.to_string(),
    })
}
