//! HTTP session for making API requests
//!
//! The session owns the `reqwest` client and the [`Config`]. It raises only
//! transport-level failures itself; status interpretation lives in
//! [`ApiResponse`] so callers that care about specific statuses (not-modified
//! pages, not-ready membership results) can inspect them before unwrapping.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pagination::Params;
use bytes::Bytes;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// An HTTP session bound to one access token
#[derive(Debug)]
pub struct Session {
    client: Client,
    config: Config,
}

impl Session {
    /// Create a new session from a config
    pub fn new(config: Config) -> Result<Self> {
        // bad base URLs fail at construction, not mid-request
        Url::parse(&config.api_url)?;
        Url::parse(&config.image_api_url)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// The session's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make a GET request
    pub async fn get(&self, path: &str, query: &Params) -> Result<ApiResponse> {
        self.request(Method::GET, path, Some(query), None).await
    }

    /// Make a POST request with an optional JSON body
    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<ApiResponse> {
        self.request(Method::POST, path, None, body).await
    }

    /// Make a POST request carrying query parameters instead of a body
    pub async fn post_query(&self, path: &str, query: &Params) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(query), None).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str, query: &Params) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, Some(query), None).await
    }

    /// Upload a file as multipart form data
    pub async fn upload(&self, path: &str, field: &str, data: Bytes) -> Result<ApiResponse> {
        let url = self.build_url(path);
        let part = reqwest::multipart::Part::stream(data).file_name(field.to_string());
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        debug!(%url, "uploading file");
        let response = self
            .client
            .post(&url)
            .header("X-Access-Token", &self.config.token)
            .multipart(form)
            .send()
            .await?;

        Self::read(response).await
    }

    /// Fetch raw bytes from an absolute URL (image downloads)
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .header("X-Access-Token", &self.config.token)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Error::api(status.as_u16(), "download failed"));
        }
        Ok(body)
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&Params>,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let url = self.build_url(path);

        let mut req = self
            .client
            .request(method.clone(), &url)
            .header("X-Access-Token", &self.config.token);

        if let Some(query) = query {
            if !query.is_empty() {
                req = req.query(query);
            }
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!(%method, %url, "api request");
        let response = req.send().await?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() && status != StatusCode::NOT_MODIFIED {
            warn!(status = status.as_u16(), "api returned an error status");
        }
        Ok(ApiResponse { status, body })
    }

    /// Build a full URL from a path, passing absolute URLs through untouched
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.config.api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Build a URL under the image service base
    pub(crate) fn image_url(&self, path: &str) -> String {
        let base = self.config.image_api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

/// A raw API response: status code plus the unparsed body
///
/// Most callers go straight to [`data`](ApiResponse::data); resource code
/// that needs status-specific behavior checks [`status`](ApiResponse::status)
/// first.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Bytes,
}

impl ApiResponse {
    /// The HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the server signaled "no new data" for a conditional fetch
    pub fn is_not_modified(&self) -> bool {
        self.status == StatusCode::NOT_MODIFIED
    }

    /// Unwrap the response envelope and return the data payload.
    ///
    /// The API wraps everything in `{"response": ..., "meta": {...}}`; the
    /// image service uses `{"payload": ...}`. Populated `meta.errors` or a
    /// non-success status become [`Error::Api`].
    pub fn data(&self) -> Result<Value> {
        let value: Value = serde_json::from_slice(&self.body).map_err(|_| Error::InvalidJson {
            status: self.status.as_u16(),
        })?;

        if let Some(errors) = value.pointer("/meta/errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let status = value
                    .pointer("/meta/code")
                    .and_then(Value::as_u64)
                    .and_then(|code| u16::try_from(code).ok())
                    .unwrap_or(self.status.as_u16());
                let message = errors
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(Error::api(status, message));
            }
        }

        if !self.status.is_success() {
            return Err(Error::api(self.status.as_u16(), "request failed"));
        }

        value
            .get("response")
            .or_else(|| value.get("payload"))
            .cloned()
            .ok_or(Error::MissingData)
    }

    /// Succeed or fail without caring about the payload.
    ///
    /// For endpoints whose response body carries nothing useful (likes,
    /// destroys, removals).
    pub fn ok(&self) -> Result<()> {
        if self.status.is_success() {
            Ok(())
        } else {
            self.data().map(|_| ())
        }
    }
}
