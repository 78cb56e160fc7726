//! REST client core: endpoints, headers and response handling

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Method, RequestBuilder, Url};
use scp_cloud::{ApiError, ApiResult, CloudError, ResolvedConfig};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const HEADER_PROJECT_ID: &str = "X-Cmp-ProjectId";
pub const HEADER_ACCESS_KEY: &str = "X-Cmp-AccessKey";
pub const HEADER_CLIENT_TYPE: &str = "X-Cmp-ClientType";
pub const CLIENT_TYPE: &str = "OpenApi";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// reqwest-based binding of every service domain
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    project_id: String,
    access_key: String,
    authorization: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &ResolvedConfig) -> scp_cloud::Result<Self> {
        let base_url = Url::parse(&config.host)
            .map_err(|e| CloudError::invalid_input("host", e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("scp-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CloudError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            project_id: config.project_id.clone(),
            access_key: config.access_key.clone(),
            authorization: basic_credentials(&config.access_key, &config.secret_key),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL joined with percent-encoded path segments
    pub fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::transport(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(method = %method, url = %url, "SCP API request");

        Ok(self
            .client
            .request(method, url)
            .header(HEADER_PROJECT_ID, &self.project_id)
            .header(HEADER_ACCESS_KEY, &self.access_key)
            .header(HEADER_CLIENT_TYPE, CLIENT_TYPE)
            .header(reqwest::header::AUTHORIZATION, &self.authorization))
    }

    /// Send and decode a JSON body
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = checked(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::transport(format!("invalid response body: {}", e)))
    }

    /// Send and ignore the body
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        checked(request).await.map(|_| ())
    }
}

async fn checked(request: RequestBuilder) -> ApiResult<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = error_message(&text)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    tracing::debug!(status = status.as_u16(), message = %message, "SCP API error");
    Err(ApiError::new(status.as_u16(), message))
}

fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .message
            .or_else(|| parsed.error.and_then(|e| e.message))
            .or_else(|| Some(body.trim().to_string())),
        Err(_) => Some(body.trim().to_string()),
    }
}

fn basic_credentials(access_key: &str, secret_key: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", access_key, secret_key))
    )
}
