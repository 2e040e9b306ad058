//! GCP-backed providers
//!
//! Real implementations of the collaborator traits over the managed
//! services' REST APIs: Cloud DLP for detection and de-identification,
//! Cloud Storage for the document areas, Cloud Pub/Sub for signaling.
//! All three share one authenticated [`GcpClient`].

mod client;

pub use client::{GcpClient, GcpConfig};

use crate::error::{PipelineError, Result};
use crate::types::{ByteContentItem, ContentItem, DeidentifyRequest, DlpJob, InspectJobConfig};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{DlpService, ObjectStore, Publisher};

/// Cloud DLP detection service
pub struct GcpDlp {
    client: Arc<GcpClient>,
}

impl GcpDlp {
    pub fn new(client: Arc<GcpClient>) -> Self {
        Self { client }
    }
}

/// Request envelope for job creation
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateJobRequest<'a> {
    inspect_job: &'a InspectJobConfig,
}

/// The service echoes the created job; only the handle matters here
#[derive(Deserialize)]
struct CreatedJob {
    name: String,
}

#[derive(Deserialize)]
struct DeidentifyResponse {
    item: ContentItem,
}

#[async_trait]
impl DlpService for GcpDlp {
    async fn create_inspect_job(&self, parent: &str, job: &InspectJobConfig) -> Result<String> {
        let url = format!("{}/{}/dlpJobs", self.client.config().dlp_endpoint, parent);
        let created: CreatedJob = self
            .client
            .post_json(&url, &CreateJobRequest { inspect_job: job })
            .await
            .map_err(|e| PipelineError::Detection {
                operation: "create_inspect_job".to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(job = %created.name, "Inspection job created");
        Ok(created.name)
    }

    async fn get_job(&self, name: &str) -> Result<DlpJob> {
        let url = format!("{}/{}", self.client.config().dlp_endpoint, name);
        self.client
            .get_json(&url)
            .await
            .map_err(|e| PipelineError::Detection {
                operation: "get_job".to_string(),
                reason: e.to_string(),
            })
    }

    async fn deidentify(&self, request: &DeidentifyRequest) -> Result<ByteContentItem> {
        let url = format!(
            "{}/{}/content:deidentify",
            self.client.config().dlp_endpoint,
            request.parent
        );

        // Parent travels in the URL path, not the body.
        let body = serde_json::json!({
            "deidentifyConfig": request.deidentify_config,
            "inspectConfig": request.inspect_config,
            "item": request.item,
        });

        let response: DeidentifyResponse = self
            .client
            .post_json(&url, &body)
            .await
            .map_err(|e| PipelineError::Detection {
                operation: "deidentify".to_string(),
                reason: e.to_string(),
            })?;

        Ok(response.item.byte_item)
    }

    fn name(&self) -> &str {
        "gcp"
    }
}

/// Cloud Storage object store
pub struct GcpStorage {
    client: Arc<GcpClient>,
}

impl GcpStorage {
    pub fn new(client: Arc<GcpClient>) -> Self {
        Self { client }
    }

    fn object_url(&self, bucket: &str, object: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.client.config().storage_endpoint,
            bucket,
            urlencoding::encode(object)
        )
    }

    fn storage_err(bucket: &str, object: &str, e: PipelineError) -> PipelineError {
        PipelineError::Storage {
            bucket: bucket.to_string(),
            object: object.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for GcpStorage {
    async fn copy(&self, src_bucket: &str, dst_bucket: &str, object: &str) -> Result<()> {
        let url = format!(
            "{}/copyTo/b/{}/o/{}",
            self.object_url(src_bucket, object),
            dst_bucket,
            urlencoding::encode(object)
        );
        self.client
            .post_empty(&url)
            .await
            .map_err(|e| Self::storage_err(src_bucket, object, e))
    }

    async fn delete(&self, bucket: &str, object: &str) -> Result<()> {
        let url = self.object_url(bucket, object);
        self.client
            .delete(&url)
            .await
            .map_err(|e| Self::storage_err(bucket, object, e))
    }

    async fn download(&self, bucket: &str, object: &str) -> Result<Bytes> {
        let url = format!("{}?alt=media", self.object_url(bucket, object));
        self.client
            .get_bytes(&url)
            .await
            .map_err(|e| Self::storage_err(bucket, object, e))
    }

    async fn upload(&self, bucket: &str, object: &str, data: Bytes) -> Result<()> {
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.client.config().storage_endpoint,
            bucket,
            urlencoding::encode(object)
        );
        self.client
            .post_bytes(&url, data)
            .await
            .map_err(|e| Self::storage_err(bucket, object, e))
    }

    fn name(&self) -> &str {
        "gcp"
    }
}

/// Cloud Pub/Sub publisher
pub struct GcpPublisher {
    client: Arc<GcpClient>,
}

impl GcpPublisher {
    pub fn new(client: Arc<GcpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Publisher for GcpPublisher {
    async fn publish(&self, topic: &str, data: Vec<u8>) -> Result<()> {
        let url = format!("{}/{}:publish", self.client.config().pubsub_endpoint, topic);
        let body = serde_json::json!({
            "messages": [{"data": STANDARD.encode(&data)}],
        });

        self.client
            .post_json_discard(&url, &body)
            .await
            .map_err(|e| PipelineError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }

    fn name(&self) -> &str {
        "gcp"
    }
}
