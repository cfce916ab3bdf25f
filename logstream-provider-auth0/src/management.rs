//! Auth0 Management API client for log streams

use async_trait::async_trait;
use log::debug;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ManagementConfig;
use crate::log_stream::LogStreamRecord;

/// Errors returned by the Management API or while talking to it
#[derive(Debug, Error)]
pub enum ManagementError {
    /// The API answered with a non-success status
    #[error("{status} {error}: {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
        error_code: Option<String>,
    },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be understood
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ManagementError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ManagementError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// Error body of the Management API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    status_code: Option<u16>,
    error: Option<String>,
    message: Option<String>,
    error_code: Option<String>,
}

/// Log stream endpoints of the Management API
///
/// Every call reports a missing stream as an error for which
/// [`ManagementError::is_not_found`] holds.
#[async_trait]
pub trait LogStreamApi: Send + Sync {
    /// Create a log stream, returning it with its assigned `id`
    async fn create(&self, record: &LogStreamRecord) -> Result<LogStreamRecord, ManagementError>;

    async fn read(&self, id: &str) -> Result<LogStreamRecord, ManagementError>;

    /// Patch a log stream with the fields present in `record`
    async fn update(
        &self,
        id: &str,
        record: &LogStreamRecord,
    ) -> Result<LogStreamRecord, ManagementError>;

    async fn delete(&self, id: &str) -> Result<(), ManagementError>;
}

/// reqwest-backed implementation of [`LogStreamApi`]
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl ManagementClient {
    pub fn new(config: &ManagementConfig) -> Result<Self, ManagementError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url(),
            api_token: config.api_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .bearer_auth(&self.api_token)
    }

    /// Send a request and decode a JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ManagementError> {
        let response = Self::check(request.send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Turn a non-success response into [`ManagementError::Api`]
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ManagementError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: Option<ApiErrorBody> = serde_json::from_str(&text).ok();
        let reason = status.canonical_reason().unwrap_or("Error").to_string();

        Err(match body {
            Some(body) => ManagementError::Api {
                status: body.status_code.unwrap_or(status.as_u16()),
                error: body.error.unwrap_or(reason),
                message: body.message.unwrap_or_default(),
                error_code: body.error_code,
            },
            None => ManagementError::Api {
                status: status.as_u16(),
                error: reason,
                message: text,
                error_code: None,
            },
        })
    }
}

#[async_trait]
impl LogStreamApi for ManagementClient {
    async fn create(&self, record: &LogStreamRecord) -> Result<LogStreamRecord, ManagementError> {
        let request = self.request(Method::POST, "log-streams").json(record);
        self.send_json(request).await
    }

    async fn read(&self, id: &str) -> Result<LogStreamRecord, ManagementError> {
        let request = self.request(Method::GET, &format!("log-streams/{}", id));
        self.send_json(request).await
    }

    async fn update(
        &self,
        id: &str,
        record: &LogStreamRecord,
    ) -> Result<LogStreamRecord, ManagementError> {
        let request = self
            .request(Method::PATCH, &format!("log-streams/{}", id))
            .json(record);
        self.send_json(request).await
    }

    async fn delete(&self, id: &str) -> Result<(), ManagementError> {
        let request = self.request(Method::DELETE, &format!("log-streams/{}", id));
        Self::check(request.send().await?).await?;
        Ok(())
    }
}
