//! Collaborator traits — the core abstractions over external services
//!
//! The pipeline touches three managed services: a sensitive-data detection
//! service, an object store, and a notification service. Each is reached
//! through a narrow trait so backends can be swapped (REST clients in
//! production, in-memory doubles in tests) without changing handler code.

use crate::error::Result;
use crate::types::{ByteContentItem, DeidentifyRequest, DlpJob, InspectJobConfig};
use async_trait::async_trait;
use bytes::Bytes;

pub mod gcp;
pub mod memory;

/// Sensitive-data detection service
///
/// Job creation is submit-and-forget: the service inspects the referenced
/// storage object asynchronously and signals completion through the job's
/// configured actions. De-identification is a synchronous request/response.
#[async_trait]
pub trait DlpService: Send + Sync {
    /// Submit an asynchronous inspection job, returning its handle
    async fn create_inspect_job(&self, parent: &str, job: &InspectJobConfig) -> Result<String>;

    /// Fetch a job's current state and result by handle
    async fn get_job(&self, name: &str) -> Result<DlpJob>;

    /// Synchronously de-identify a content item
    async fn deidentify(&self, request: &DeidentifyRequest) -> Result<ByteContentItem>;

    /// Backend name (e.g., "gcp", "memory")
    fn name(&self) -> &str;
}

/// Object store holding the staging, sensitive, and non-sensitive areas
///
/// A move between areas is copy-then-delete; no atomicity is guaranteed
/// beyond what the backend offers for the individual operations.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Duplicate an object into another bucket under the same name
    async fn copy(&self, src_bucket: &str, dst_bucket: &str, object: &str) -> Result<()>;

    /// Remove an object from a bucket
    async fn delete(&self, bucket: &str, object: &str) -> Result<()>;

    /// Download an object's full content
    async fn download(&self, bucket: &str, object: &str) -> Result<Bytes>;

    /// Create or overwrite an object with the given content
    async fn upload(&self, bucket: &str, object: &str, data: Bytes) -> Result<()>;

    /// Backend name
    fn name(&self) -> &str;
}

/// Notification service for cross-stage signaling
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish an opaque payload to a topic (fire-and-forget)
    async fn publish(&self, topic: &str, data: Vec<u8>) -> Result<()>;

    /// Backend name
    fn name(&self) -> &str;

    /// Full topic resource path for a project and topic id
    fn topic_path(&self, project_id: &str, topic_id: &str) -> String {
        format!("projects/{}/topics/{}", project_id, topic_id)
    }
}
