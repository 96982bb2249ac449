//! Network client: raw HTTP requests and downloads

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;
use wellness_core::{ApiError, ApiRequest, HttpMethod};

use crate::sync::Locked;

#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Execute `request` and return the response body.
    ///
    /// Non-2xx statuses fail with [`ApiError::NetworkError`].
    async fn request(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError>;

    /// Execute `request` and write the body to `destination`
    async fn download(&self, request: ApiRequest, destination: &Path)
        -> Result<PathBuf, ApiError>;
}

async fn write_body(destination: &Path, body: &[u8]) -> Result<PathBuf, ApiError> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ApiError::UnknownError(e.to_string()))?;
    }
    tokio::fs::write(destination, body)
        .await
        .map_err(|e| ApiError::UnknownError(e.to_string()))?;
    Ok(destination.to_path_buf())
}

// ── Live ────────────────────────────────────────────────────────────────────

/// reqwest-backed client
#[derive(Debug, Clone)]
pub struct LiveNetworkClient {
    http: reqwest::Client,
}

impl LiveNetworkClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::UnknownError(e.to_string()))?;
        Ok(Self { http })
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

#[async_trait]
impl NetworkClient for LiveNetworkClient {
    async fn request(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let ApiRequest {
            url,
            method,
            headers,
            body,
        } = request;

        tracing::debug!("{} {}", method, url);

        let mut builder = self.http.request(Self::method(method), url.clone());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::UnknownError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} {} -> {}", method, url, status);
            return Err(ApiError::NetworkError(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::UnknownError(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn download(
        &self,
        request: ApiRequest,
        destination: &Path,
    ) -> Result<PathBuf, ApiError> {
        let body = self.request(request).await?;
        write_body(destination, &body).await
    }
}

// ── Mock ────────────────────────────────────────────────────────────────────

/// Canned responses keyed by URL; anything unknown fails with `NoData`
#[derive(Debug, Default)]
pub struct MockNetworkClient {
    responses: Locked<HashMap<String, Result<Vec<u8>, ApiError>>>,
    requests: Locked<Vec<ApiRequest>>,
}

impl MockNetworkClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .with(|r| r.insert(normalize(url), Ok(body.into())));
        self
    }

    pub fn with_failure(self, url: &str, error: ApiError) -> Self {
        self.responses.with(|r| r.insert(normalize(url), Err(error)));
        self
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.get()
    }
}

// Match the form `Url` serializes to, e.g. a trailing slash on bare hosts.
fn normalize(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), String::from)
}

#[async_trait]
impl NetworkClient for MockNetworkClient {
    async fn request(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let key = request.url.to_string();
        self.requests.with(|r| r.push(request));
        self.responses
            .with(|r| r.get(&key).cloned())
            .unwrap_or(Err(ApiError::NoData))
    }

    async fn download(
        &self,
        request: ApiRequest,
        destination: &Path,
    ) -> Result<PathBuf, ApiError> {
        let body = self.request(request).await?;
        write_body(destination, &body).await
    }
}
