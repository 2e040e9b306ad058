//! Authenticated HTTP client shared by the GCP providers

use crate::error::{PipelineError, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// GCP provider configuration
///
/// Credential acquisition is out of scope; callers supply a ready bearer
/// token. Endpoint bases are overridable so tests and emulators can point
/// at a local server.
#[derive(Debug, Clone)]
pub struct GcpConfig {
    /// OAuth2 bearer token sent with every request
    pub access_token: String,

    /// Detection service base, e.g. `https://dlp.googleapis.com/v2`
    pub dlp_endpoint: String,

    /// Object store base, e.g. `https://storage.googleapis.com`
    pub storage_endpoint: String,

    /// Notification service base, e.g. `https://pubsub.googleapis.com/v1`
    pub pubsub_endpoint: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            dlp_endpoint: "https://dlp.googleapis.com/v2".to_string(),
            storage_endpoint: "https://storage.googleapis.com".to_string(),
            pubsub_endpoint: "https://pubsub.googleapis.com/v1".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl GcpConfig {
    /// Config with a bearer token and default public endpoints
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }
}

/// Shared authenticated HTTP client
///
/// Thin wrapper over `reqwest` that attaches the bearer token, enforces the
/// configured timeout, and turns non-success statuses into errors carrying
/// the response body.
pub struct GcpClient {
    http: reqwest::Client,
    config: Arc<GcpConfig>,
}

impl GcpClient {
    pub fn new(config: GcpConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &GcpConfig {
        &self.config
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(self.http.get(url)).await?;
        response
            .json()
            .await
            .map_err(|e| PipelineError::Transport(format!("invalid response body: {}", e)))
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(self.http.post(url).json(body)).await?;
        response
            .json()
            .await
            .map_err(|e| PipelineError::Transport(format!("invalid response body: {}", e)))
    }

    /// POST a JSON body, discarding the response payload
    pub async fn post_json_discard<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<()> {
        self.send(self.http.post(url).json(body)).await?;
        Ok(())
    }

    /// POST raw bytes, discarding the response payload
    pub async fn post_bytes(&self, url: &str, data: Bytes) -> Result<()> {
        self.send(self.http.post(url).body(data)).await?;
        Ok(())
    }

    /// POST with an empty body, discarding the response payload
    pub async fn post_empty(&self, url: &str) -> Result<()> {
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        let response = self.send(self.http.get(url)).await?;
        response
            .bytes()
            .await
            .map_err(|e| PipelineError::Transport(format!("failed to read body: {}", e)))
    }

    pub async fn delete(&self, url: &str) -> Result<()> {
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| PipelineError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transport(format!("HTTP {}: {}", status, body)));
        }

        Ok(response)
    }
}
