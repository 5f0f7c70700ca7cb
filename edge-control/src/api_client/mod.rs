//! API client library.
//!
//! A small reqwest client for a running edge-control server, used by the
//! `edge-cli` binary.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::api::types::{ErrorResponse, HealthStatus, PowerState};
use crate::temperature::TemperatureReading;

/// Default server address for the CLI.
pub const DEFAULT_URL: &str = "http://localhost:8000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors returned by [`Client`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// Could not reach the server or decode its answer
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with an error status
    #[error("server returned {status}: {detail}")]
    Api { status: StatusCode, detail: String },
}

/// Client for the edge-control HTTP API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.send(self.http.get(self.url("/health"))).await
    }

    /// `GET /temperature`
    pub async fn temperature(&self) -> Result<TemperatureReading, ClientError> {
        self.send(self.http.get(self.url("/temperature"))).await
    }

    /// `POST /power?powerOn=...`
    pub async fn set_power(&self, power_on: bool) -> Result<PowerState, ClientError> {
        let request = self
            .http
            .post(self.url("/power"))
            .query(&[("powerOn", power_on)]);
        self.send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Not every error body is ours (e.g. axum's plain-text rejections).
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.detail)
            .unwrap_or(text);
        Err(ClientError::Api { status, detail })
    }
}
