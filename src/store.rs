use crate::config::Config;
use crate::error::LoggerError;
use crate::types::{
    ApiErrorBody, Committer, ContentsResponse, PutContentsRequest, RemoteFileState,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use log::debug;
use reqwest::StatusCode;
use std::time::Duration;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// A versioned blob store addressed by path.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Current content and version token of `path`; a missing file is an empty state.
    async fn fetch(&self, path: &str) -> Result<RemoteFileState, LoggerError>;

    /// Replaces `path` with `content`, guarded by `token` when the file already exists.
    async fn write(
        &self,
        path: &str,
        content: &str,
        token: Option<&str>,
    ) -> Result<(), LoggerError>;
}

#[async_trait]
impl<T: ContentStore + ?Sized> ContentStore for Box<T> {
    async fn fetch(&self, path: &str) -> Result<RemoteFileState, LoggerError> {
        (**self).fetch(path).await
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        token: Option<&str>,
    ) -> Result<(), LoggerError> {
        (**self).write(path, content, token).await
    }
}

#[derive(Debug, Clone)]
pub struct GitHubStore {
    client: reqwest::Client,
    api_root: String,
    owner: String,
    repo: String,
    token: String,
    commit_message: String,
    committer: Committer,
}

impl GitHubStore {
    pub fn from_config(config: &Config) -> Result<Self, LoggerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_root: config.api_root.trim_end_matches('/').to_string(),
            owner: config.repo_owner.clone(),
            repo: config.repo_name.clone(),
            token: config.github_token.clone(),
            commit_message: config.commit_message.clone(),
            committer: config.committer(),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/contents/{}", self.api_root, self.owner, self.repo, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.contents_url(path))
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn fetch(&self, path: &str) -> Result<RemoteFileState, LoggerError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        let status = response.status();
        debug!("GET contents/{} -> {}", path, status);

        if status == StatusCode::NOT_FOUND {
            return Ok(RemoteFileState::missing());
        }
        if !status.is_success() {
            return Err(LoggerError::RemoteReadError {
                status: status.as_u16(),
            });
        }

        let data: ContentsResponse = response.json().await?;
        if let Some(encoding) = data.encoding.as_deref() {
            if encoding != "base64" {
                return Err(LoggerError::DecodeError(format!(
                    "unsupported encoding: {}",
                    encoding
                )));
            }
        }

        Ok(RemoteFileState {
            content_token: Some(data.sha),
            decoded_text: decode_content(&data.content)?,
        })
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        token: Option<&str>,
    ) -> Result<(), LoggerError> {
        let body = PutContentsRequest {
            message: self.commit_message.clone(),
            content: BASE64_STANDARD.encode(content),
            sha: token.map(str::to_string),
            committer: self.committer.clone(),
        };

        let response = self
            .request(reqwest::Method::PUT, path)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        debug!("PUT contents/{} -> {}", path, status);

        if status.is_success() {
            return Ok(());
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(err) => err.message,
            Err(_) => status.to_string(),
        };
        Err(LoggerError::RemoteWriteError { message })
    }
}

/// GitHub wraps base64 content at 60 columns.
pub fn decode_content(encoded: &str) -> Result<String, LoggerError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(compact)
        .map_err(|e| LoggerError::DecodeError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| LoggerError::DecodeError(e.to_string()))
}
