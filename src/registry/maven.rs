use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};

use crate::error::MetadataLookupError;
use crate::models::{ArtifactKey, ArtifactMetadata};
use crate::pom::Pom;

use super::MetadataSource;

/// Value of the `p` (packaging) query parameter: we always ask for the POM.
const DESCRIPTOR_PACKAGING: &str = "pom";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Connection parameters for a Maven repository manager's artifact redirect
/// service (e.g. Nexus `service/local/artifact/maven/redirect`).
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub uri: String,
    pub repository: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl RepositoryConfig {
    /// Basic-auth credentials, only when both parts are non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.trim().is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.trim().is_empty())?;
        Some((username, password))
    }
}

/// Fetches POMs through the redirect service, one GET per `(artifact, version)`.
pub struct MavenRedirectClient {
    client: Client,
    config: RepositoryConfig,
}

impl MavenRedirectClient {
    pub fn new(config: RepositoryConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(10))
            .user_agent(concat!("pom-inventory/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl MetadataSource for MavenRedirectClient {
    async fn fetch_metadata(
        &self,
        key: &ArtifactKey,
        version: &str,
    ) -> Result<Option<ArtifactMetadata>, MetadataLookupError> {
        let coordinates = format!("{}:{}", key, version);

        let mut request = self.client.get(&self.config.uri).query(&[
            ("p", DESCRIPTOR_PACKAGING),
            ("r", self.config.repository.as_str()),
            ("v", version),
            ("g", key.group_id.as_str()),
            ("a", key.artifact_id.as_str()),
        ]);
        if let Some((username, password)) = self.config.credentials() {
            request = request.basic_auth(username, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| request_error(&coordinates, e))?;

        if response.status() != StatusCode::OK {
            return Err(MetadataLookupError::Status {
                coordinates,
                status: response.status(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| request_error(&coordinates, e))?;

        // Repository managers answer unknown artifacts with an HTML page
        if is_html(&body) {
            return Ok(None);
        }

        let pom = Pom::from_xml(&body)
            .map_err(|source| MetadataLookupError::Malformed { coordinates, source })?;
        Ok(Some(pom.metadata()))
    }
}

fn request_error(coordinates: &str, e: reqwest::Error) -> MetadataLookupError {
    if e.is_timeout() {
        MetadataLookupError::Timeout {
            coordinates: coordinates.to_string(),
        }
    } else {
        MetadataLookupError::Transport {
            coordinates: coordinates.to_string(),
            source: e,
        }
    }
}

fn is_html(body: &str) -> bool {
    body.to_ascii_lowercase().contains("</html>")
}
