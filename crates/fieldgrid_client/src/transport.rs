//! Save transport seam and its reqwest implementation.

use crate::SyncError;
use fieldgrid_core::models::grid::GridPage;
use fieldgrid_core::models::post::{PostId, PostTypeDescriptor, PostTypeFilter};
use fieldgrid_core::sync::{SaveBatch, SaveRequest, SaveResponse, SaveSummary, TokenResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// The two calls the sync driver makes per batch.
#[allow(async_fn_in_trait)]
pub trait SaveTransport {
    /// Obtain a fresh anti-forgery token.
    async fn fetch_token(&self) -> Result<String, SyncError>;

    /// Send one batch and return the server's summary for it.
    async fn send_batch(&self, token: &str, batch: &SaveBatch) -> Result<SaveSummary, SyncError>;
}

/// Build an API URL by appending encoded path segments to `server`.
///
/// # Errors
/// Returns [`SyncError::InvalidUrl`] when `server` is not an absolute URL that
/// can carry a path.
pub fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, SyncError> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| SyncError::InvalidUrl(format!("'{}': {}", server, err)))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| SyncError::InvalidUrl(format!("'{}' cannot be used as an API base", server)))?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return message.to_string();
        }
        if value.get("success") == Some(&Value::Bool(false)) {
            if let Some(message) = value.get("data").and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }

    body.to_string()
}

/// HTTP client for a FieldGrid server.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    server: String,
}

impl HttpTransport {
    /// Create a transport for `server` with a per-request timeout.
    ///
    /// # Errors
    /// Returns an error when the URL is unusable or the client cannot be
    /// built.
    pub fn new(server: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("fgrid/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        Self::with_client(http, server)
    }

    /// Wrap an existing client.
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidUrl`] when `server` is not a usable base URL.
    pub fn with_client(http: reqwest::Client, server: impl Into<String>) -> Result<Self, SyncError> {
        let mut server = server.into();
        while server.ends_with('/') {
            server.pop();
        }
        api_url(&server, &[])?;
        Ok(Self { http, server })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, SyncError> {
        api_url(&self.server, segments)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SyncError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SyncError::HttpStatus {
                status: status.as_u16(),
                message: error_message_for_response(status, &body),
            });
        }
        serde_json::from_str(&body).map_err(|err| SyncError::Parse(err.to_string()))
    }

    async fn read_envelope(response: reqwest::Response) -> Result<SaveSummary, SyncError> {
        let envelope: SaveResponse = Self::read_json(response).await?;
        envelope.into_result().map_err(SyncError::Rejected)
    }

    /// List registered post types.
    pub async fn post_types(&self) -> Result<Vec<PostTypeDescriptor>, SyncError> {
        let response = self
            .http
            .get(self.url(&["api", "post-types"])?)
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Fetch one grid page.
    pub async fn grid(&self, filter: &PostTypeFilter, page: usize) -> Result<GridPage, SyncError> {
        let page = page.to_string();
        let response = self
            .http
            .get(self.url(&["api", "grid"])?)
            .query(&[
                ("post_type", filter.as_query_value()),
                ("page", page.as_str()),
            ])
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Delete `key` from one post, or from every post when `post_id` is `None`.
    pub async fn delete_field(
        &self,
        post_id: Option<PostId>,
        key: &str,
    ) -> Result<SaveSummary, SyncError> {
        let token = self.fetch_token().await?;
        let url = match post_id {
            Some(id) => {
                let id = id.to_string();
                self.url(&["api", "posts", id.as_str(), "fields", key])?
            }
            None => self.url(&["api", "fields", key])?,
        };
        let response = self
            .http
            .delete(url)
            .query(&[("token", token.as_str())])
            .send()
            .await?;
        Self::read_envelope(response).await
    }
}

impl SaveTransport for HttpTransport {
    async fn fetch_token(&self) -> Result<String, SyncError> {
        let response = self.http.get(self.url(&["api", "token"])?).send().await?;
        let issued: TokenResponse = Self::read_json(response).await?;
        Ok(issued.token)
    }

    async fn send_batch(&self, token: &str, batch: &SaveBatch) -> Result<SaveSummary, SyncError> {
        let request = SaveRequest {
            token: token.to_string(),
            data: batch.clone(),
        };
        let response = self
            .http
            .post(self.url(&["api", "save"])?)
            .json(&request)
            .send()
            .await?;
        Self::read_envelope(response).await
    }
}
