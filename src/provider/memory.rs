//! In-memory providers for testing and single-process use
//!
//! Every implementation records the calls made against it so callers can
//! assert exact operation sequences. Operations against missing objects
//! are recorded but do not fail, which lets end-to-end tests observe full
//! handler call sequences without pre-seeding every intermediate state.

use crate::error::{PipelineError, Result};
use crate::types::{ByteContentItem, DeidentifyRequest, DlpJob, InspectJobConfig};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};

use super::{DlpService, ObjectStore, Publisher};

/// A recorded job submission
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub parent: String,
    pub config: InspectJobConfig,
}

/// In-memory detection service
///
/// Jobs are seeded with [`insert_job`](MemoryDlp::insert_job); submissions
/// and de-identify requests are recorded. De-identification echoes the
/// request item unless a canned response is set.
#[derive(Default)]
pub struct MemoryDlp {
    jobs: RwLock<HashMap<String, DlpJob>>,
    submitted: Mutex<Vec<SubmittedJob>>,
    deidentify_requests: Mutex<Vec<DeidentifyRequest>>,
    deidentify_response: RwLock<Option<ByteContentItem>>,
    fail_submissions: AtomicBool,
    next_id: AtomicU64,
}

impl MemoryDlp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a job so it can be fetched by handle
    pub async fn insert_job(&self, job: DlpJob) {
        self.jobs.write().await.insert(job.name.clone(), job);
    }

    /// Make subsequent job submissions fail
    pub fn fail_submissions(&self, fail: bool) {
        self.fail_submissions.store(fail, Ordering::SeqCst);
    }

    /// Set the canned de-identify response
    pub async fn set_deidentify_response(&self, item: ByteContentItem) {
        *self.deidentify_response.write().await = Some(item);
    }

    /// All job submissions recorded so far
    pub async fn submitted_jobs(&self) -> Vec<SubmittedJob> {
        self.submitted.lock().await.clone()
    }

    /// All de-identify requests recorded so far
    pub async fn deidentify_requests(&self) -> Vec<DeidentifyRequest> {
        self.deidentify_requests.lock().await.clone()
    }
}

#[async_trait]
impl DlpService for MemoryDlp {
    async fn create_inspect_job(&self, parent: &str, job: &InspectJobConfig) -> Result<String> {
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(PipelineError::Detection {
                operation: "create_inspect_job".to_string(),
                reason: "simulated submission failure".to_string(),
            });
        }

        self.submitted.lock().await.push(SubmittedJob {
            parent: parent.to_string(),
            config: job.clone(),
        });

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}/dlpJobs/i-{}", parent, id))
    }

    async fn get_job(&self, name: &str) -> Result<DlpJob> {
        self.jobs
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| PipelineError::Detection {
                operation: "get_job".to_string(),
                reason: format!("no such job: {}", name),
            })
    }

    async fn deidentify(&self, request: &DeidentifyRequest) -> Result<ByteContentItem> {
        self.deidentify_requests.lock().await.push(request.clone());

        let canned = self.deidentify_response.read().await.clone();
        Ok(canned.unwrap_or_else(|| request.item.byte_item.clone()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// One recorded object-store operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Copy {
        src_bucket: String,
        dst_bucket: String,
        object: String,
    },
    Delete {
        bucket: String,
        object: String,
    },
    Download {
        bucket: String,
        object: String,
    },
    Upload {
        bucket: String,
        object: String,
    },
}

/// In-memory object store keyed by (bucket, object)
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<(String, String), Bytes>>,
    ops: Mutex<Vec<StoreOp>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object
    pub async fn put(&self, bucket: &str, object: &str, data: impl Into<Bytes>) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), object.to_string()), data.into());
    }

    /// Current content of an object, if present
    pub async fn get(&self, bucket: &str, object: &str) -> Option<Bytes> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), object.to_string()))
            .cloned()
    }

    /// All operations recorded so far
    pub async fn operations(&self) -> Vec<StoreOp> {
        self.ops.lock().await.clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn copy(&self, src_bucket: &str, dst_bucket: &str, object: &str) -> Result<()> {
        self.ops.lock().await.push(StoreOp::Copy {
            src_bucket: src_bucket.to_string(),
            dst_bucket: dst_bucket.to_string(),
            object: object.to_string(),
        });

        let mut objects = self.objects.write().await;
        let src = (src_bucket.to_string(), object.to_string());
        if let Some(data) = objects.get(&src).cloned() {
            objects.insert((dst_bucket.to_string(), object.to_string()), data);
        }
        Ok(())
    }

    async fn delete(&self, bucket: &str, object: &str) -> Result<()> {
        self.ops.lock().await.push(StoreOp::Delete {
            bucket: bucket.to_string(),
            object: object.to_string(),
        });

        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), object.to_string()));
        Ok(())
    }

    async fn download(&self, bucket: &str, object: &str) -> Result<Bytes> {
        self.ops.lock().await.push(StoreOp::Download {
            bucket: bucket.to_string(),
            object: object.to_string(),
        });

        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), object.to_string()))
            .cloned()
            .ok_or_else(|| PipelineError::Storage {
                bucket: bucket.to_string(),
                object: object.to_string(),
                reason: "object not found".to_string(),
            })
    }

    async fn upload(&self, bucket: &str, object: &str, data: Bytes) -> Result<()> {
        self.ops.lock().await.push(StoreOp::Upload {
            bucket: bucket.to_string(),
            object: object.to_string(),
        });

        self.objects
            .write()
            .await
            .insert((bucket.to_string(), object.to_string()), data);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// A recorded publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub data: Vec<u8>,
}

/// In-memory publisher that records every message
#[derive(Default)]
pub struct MemoryPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages published so far
    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, topic: &str, data: Vec<u8>) -> Result<()> {
        self.messages.lock().await.push(PublishedMessage {
            topic: topic.to_string(),
            data,
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BytesType, ContentItem, DeidentifyConfig, InspectConfig};
    use crate::types::{FindingLimits, InfoType, Likelihood};

    fn inspect_config() -> InspectConfig {
        InspectConfig {
            info_types: vec![InfoType::new("PHONE_NUMBER")],
            min_likelihood: Likelihood::Possible,
            limits: FindingLimits {
                max_findings_per_request: 0,
            },
        }
    }

    #[tokio::test]
    async fn test_memory_dlp_records_submissions() {
        let dlp = MemoryDlp::new();
        let job = InspectJobConfig {
            inspect_config: inspect_config(),
            storage_config: crate::types::StorageConfig::for_url("gs://b/f.txt"),
            actions: vec![],
        };

        let handle = dlp
            .create_inspect_job("projects/p", &job)
            .await
            .unwrap();
        assert!(handle.starts_with("projects/p/dlpJobs/i-"));

        let submitted = dlp.submitted_jobs().await;
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].parent, "projects/p");
        assert_eq!(submitted[0].config.storage_config.url(), "gs://b/f.txt");
    }

    #[tokio::test]
    async fn test_memory_dlp_failing_submission() {
        let dlp = MemoryDlp::new();
        dlp.fail_submissions(true);

        let job = InspectJobConfig {
            inspect_config: inspect_config(),
            storage_config: crate::types::StorageConfig::for_url("gs://b/f.txt"),
            actions: vec![],
        };
        assert!(dlp.create_inspect_job("projects/p", &job).await.is_err());
        assert!(dlp.submitted_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_memory_dlp_get_job_not_found() {
        let dlp = MemoryDlp::new();
        assert!(dlp.get_job("projects/p/dlpJobs/missing").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_dlp_deidentify_echoes_without_canned_response() {
        let dlp = MemoryDlp::new();
        let request = DeidentifyRequest {
            parent: "projects/p".to_string(),
            deidentify_config: DeidentifyConfig::character_mask('#', 25),
            inspect_config: inspect_config(),
            item: ContentItem {
                byte_item: ByteContentItem {
                    byte_type: BytesType::TextUtf8,
                    data: b"call 555-0100".to_vec(),
                },
            },
        };

        let response = dlp.deidentify(&request).await.unwrap();
        assert_eq!(response.data, b"call 555-0100");
        assert_eq!(dlp.deidentify_requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_copy_delete_move() {
        let store = MemoryStore::new();
        store.put("staging", "f.txt", Bytes::from_static(b"body")).await;

        store.copy("staging", "sensitive", "f.txt").await.unwrap();
        store.delete("staging", "f.txt").await.unwrap();

        assert!(store.get("staging", "f.txt").await.is_none());
        assert_eq!(
            store.get("sensitive", "f.txt").await.unwrap(),
            Bytes::from_static(b"body")
        );

        let ops = store.operations().await;
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], StoreOp::Copy { .. }));
        assert!(matches!(ops[1], StoreOp::Delete { .. }));
    }

    #[tokio::test]
    async fn test_memory_store_copy_of_missing_source_is_recorded() {
        let store = MemoryStore::new();
        store.copy("staging", "sensitive", "gone.txt").await.unwrap();
        assert!(store.get("sensitive", "gone.txt").await.is_none());
        assert_eq!(store.operations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_download_missing_fails() {
        let store = MemoryStore::new();
        let err = store.download("staging", "gone.txt").await.unwrap_err();
        assert!(matches!(err, PipelineError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_memory_publisher_records_messages() {
        let publisher = MemoryPublisher::new();
        let topic = publisher.topic_path("gcp-rest-deident", "new-sensitive-doc");
        assert_eq!(topic, "projects/gcp-rest-deident/topics/new-sensitive-doc");

        publisher.publish(&topic, b"f.txt".to_vec()).await.unwrap();

        let published = publisher.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, topic);
        assert_eq!(published[0].data, b"f.txt");
    }
}
