//! GitHub contents API client

use crate::config::{validate_config, AdvancedConfig, ClientConfig, ConfigFile};
use crate::contents::{
    CommitInfo, Contents, ContentsApi, DeleteRequest, FileCommit, UploadRequest,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Media type requested on every call
const GITHUB_JSON: &str = "application/vnd.github+json";

const USER_AGENT: &str = concat!("ghdrop/", env!("CARGO_PKG_VERSION"));

/// GitHub contents API client bound to one repository and branch
pub struct GitHubClient {
    config: ClientConfig,
    http_client: Client,
    base_url: Url,
}

impl GitHubClient {
    /// Create a client against api.github.com
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_options(config, &AdvancedConfig::default())
    }

    /// Create a client from a loaded configuration file
    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        let advanced = config.advanced.clone().unwrap_or_default();
        Self::with_options(config.github.clone(), &advanced)
    }

    /// Create a client with an explicit base URL and timeout
    pub fn with_options(config: ClientConfig, advanced: &AdvancedConfig) -> Result<Self> {
        validate_config(&config)?;

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(advanced.timeout))
            .build()?;

        let base_url = Url::parse(advanced.api_url.trim_end_matches('/'))
            .map_err(|e| Error::InvalidConfig(format!("Invalid API URL {}: {}", advanced.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "Invalid API URL {}: not a base URL",
                advanced.api_url
            )));
        }

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    /// Endpoint for a repository path; the root has no trailing separator.
    ///
    /// Each segment is percent-encoded, so `#`, `?` and spaces stay part of
    /// the file name.
    pub fn contents_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", self.config.owner.as_str(), self.config.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.contents_url(path))
            .bearer_auth(&self.config.token)
            .header(ACCEPT, GITHUB_JSON)
    }

    /// Handle API response
    async fn handle_response<T: DeserializeOwned>(&self, response: Response, path: &str) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        match status.as_u16() {
            401 => Err(Error::Authentication(message)),
            403 => Err(Error::PermissionDenied(message)),
            404 => Err(Error::NotFound(format!(
                "{} in {}",
                display_path(path),
                self.config.display_target()
            ))),
            code => Err(Error::GitHubApi {
                status: code,
                message,
            }),
        }
    }
}

#[async_trait]
impl ContentsApi for GitHubClient {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_contents(&self, path: &str) -> Result<Contents> {
        tracing::debug!(path, branch = %self.config.branch, "GET contents");

        let response = self
            .request(Method::GET, path)
            .query(&[("ref", self.config.branch.as_str())])
            .send()
            .await?;

        self.handle_response(response, path).await
    }

    async fn put_file(&self, path: &str, content: &str, message: &str) -> Result<FileCommit> {
        tracing::debug!(path, bytes = content.len(), "PUT contents");

        let body = UploadRequest {
            message: message.to_string(),
            content: content.to_string(),
            branch: self.config.branch.clone(),
        };

        let response = self.request(Method::PUT, path).json(&body).send().await?;

        self.handle_response(response, path).await
    }

    async fn delete_file(&self, path: &str, sha: &str, message: &str) -> Result<CommitInfo> {
        tracing::debug!(path, sha, "DELETE contents");

        let body = DeleteRequest {
            message: message.to_string(),
            sha: sha.to_string(),
            branch: self.config.branch.clone(),
        };

        let response = self.request(Method::DELETE, path).json(&body).send().await?;

        let deleted: DeleteResponse = self.handle_response(response, path).await?;
        Ok(deleted.commit)
    }
}

fn display_path(path: &str) -> &str {
    match path.trim_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Answer to a delete request; `content` is always null
#[derive(Debug, Deserialize)]
struct DeleteResponse {
    commit: CommitInfo,
}
