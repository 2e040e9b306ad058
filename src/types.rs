//! Request/response value types for the document pipeline
//!
//! All types use camelCase JSON serialization for wire compatibility with
//! the detection service's REST API. Byte fields travel as base64 strings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// Storage upload event — delivered when a file lands in the staging area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEvent {
    /// Object name within the staging bucket
    pub name: String,
}

impl UploadEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Completion notification from the detection service's pub/sub action
///
/// The job handle travels in the `DlpJobName` attribute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionNotification {
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl CompletionNotification {
    /// Build a notification carrying a job handle
    pub fn for_job(job_name: impl Into<String>) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert(JOB_NAME_ATTRIBUTE.to_string(), job_name.into());
        Self { attributes }
    }

    /// The handle of the finished inspection job
    pub fn job_name(&self) -> Result<&str> {
        self.attributes
            .get(JOB_NAME_ATTRIBUTE)
            .map(String::as_str)
            .ok_or(PipelineError::MissingAttribute(JOB_NAME_ATTRIBUTE))
    }
}

/// Attribute key carrying the job handle in completion notifications
pub const JOB_NAME_ATTRIBUTE: &str = "DlpJobName";

/// Push-subscription payload — delivered to the de-identifier
///
/// `data` is the base64-encoded name of a file in the sensitive area.
/// An absent field means there is nothing to do.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl PushPayload {
    /// Encode a file name into a push payload
    pub fn for_file(file_name: &str) -> Self {
        use base64::Engine;
        Self {
            data: Some(base64::engine::general_purpose::STANDARD.encode(file_name)),
        }
    }

    /// Decode the carried file name, if any
    pub fn file_name(&self) -> Result<Option<String>> {
        use base64::Engine;
        let Some(data) = &self.data else {
            return Ok(None);
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| PipelineError::Payload(format!("base64 decode failed: {}", e)))?;
        let name = String::from_utf8(bytes)
            .map_err(|e| PipelineError::Payload(format!("payload is not UTF-8: {}", e)))?;
        Ok(Some(name))
    }
}

// ─── Inspection ──────────────────────────────────────────────────

/// A named class of sensitive data the detection service can match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoType {
    pub name: String,
}

impl InfoType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Match-confidence threshold required before a finding is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    LikelihoodUnspecified,
    VeryUnlikely,
    Unlikely,
    #[default]
    Possible,
    Likely,
    VeryLikely,
}

/// Finding-count limits (0 = server maximum)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingLimits {
    pub max_findings_per_request: i32,
}

/// What to look for: categories, threshold, and limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectConfig {
    pub info_types: Vec<InfoType>,
    pub min_likelihood: Likelihood,
    pub limits: FindingLimits,
}

/// Source file set for a storage-backed inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSet {
    /// Fully-qualified object URL, e.g. `gs://bucket/name`
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorageOptions {
    pub file_set: FileSet,
}

/// Where the inspected content lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    pub cloud_storage_options: CloudStorageOptions,
}

impl StorageConfig {
    /// Build a storage config for a single object URL
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            cloud_storage_options: CloudStorageOptions {
                file_set: FileSet { url: url.into() },
            },
        }
    }

    /// The configured object URL
    pub fn url(&self) -> &str {
        &self.cloud_storage_options.file_set.url
    }
}

/// Notification published by the service when a job completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubSubAction {
    /// Full topic resource, e.g. `projects/p/topics/t`
    pub topic: String,
}

/// Post-completion action attached to an inspection job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAction {
    pub pub_sub: PubSubAction,
}

impl JobAction {
    pub fn publish_to(topic: impl Into<String>) -> Self {
        Self {
            pub_sub: PubSubAction {
                topic: topic.into(),
            },
        }
    }
}

/// Full description of an asynchronous inspection job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectJobConfig {
    pub inspect_config: InspectConfig,
    pub storage_config: StorageConfig,
    pub actions: Vec<JobAction>,
}

// ─── Job results ─────────────────────────────────────────────────

/// Lifecycle state of an inspection job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    #[default]
    JobStateUnspecified,
    Pending,
    Running,
    Done,
    Canceled,
    Failed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::JobStateUnspecified => "JOB_STATE_UNSPECIFIED",
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Done => "DONE",
            JobState::Canceled => "CANCELED",
            JobState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Match count for one info type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoTypeStats {
    pub info_type: InfoType,
    #[serde(default)]
    pub count: i64,
}

/// Aggregate inspection result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectResult {
    #[serde(default)]
    pub info_type_stats: Vec<InfoTypeStats>,
}

/// The job configuration as the service recorded it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedOptions {
    pub job_config: InspectJobConfig,
}

/// Details echoed back on a finished inspection job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectDetails {
    pub requested_options: RequestedOptions,
    #[serde(default)]
    pub result: InspectResult,
}

/// An inspection job as fetched by handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlpJob {
    /// Full resource name (the job handle)
    pub name: String,
    #[serde(default)]
    pub state: JobState,
    pub inspect_details: InspectDetails,
}

impl DlpJob {
    /// The source object URL echoed in the job config
    pub fn source_url(&self) -> &str {
        self.inspect_details
            .requested_options
            .job_config
            .storage_config
            .url()
    }

    /// Per-category finding counts
    pub fn findings(&self) -> &[InfoTypeStats] {
        &self.inspect_details.result.info_type_stats
    }
}

// ─── De-identification ───────────────────────────────────────────

/// Replace matched substrings with a fixed character, up to a bounded count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterMaskConfig {
    pub masking_character: String,
    pub number_to_mask: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveTransformation {
    pub character_mask_config: CharacterMaskConfig,
}

/// One transformation applied across all matched info types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoTypeTransformation {
    pub primitive_transformation: PrimitiveTransformation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoTypeTransformations {
    pub transformations: Vec<InfoTypeTransformation>,
}

/// How matched content should be transformed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeidentifyConfig {
    pub info_type_transformations: InfoTypeTransformations,
}

impl DeidentifyConfig {
    /// Single character-mask transformation over all matched categories
    pub fn character_mask(masking_character: char, number_to_mask: i32) -> Self {
        Self {
            info_type_transformations: InfoTypeTransformations {
                transformations: vec![InfoTypeTransformation {
                    primitive_transformation: PrimitiveTransformation {
                        character_mask_config: CharacterMaskConfig {
                            masking_character: masking_character.to_string(),
                            number_to_mask,
                        },
                    },
                }],
            },
        }
    }
}

/// Encoding tag for raw byte content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BytesType {
    #[serde(rename = "TEXT_UTF8")]
    TextUtf8,
    #[serde(rename = "CSV")]
    Csv,
}

/// Raw content wrapped with its encoding tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteContentItem {
    #[serde(rename = "type")]
    pub byte_type: BytesType,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// Content container accepted by the de-identify endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub byte_item: ByteContentItem,
}

/// Synchronous de-identification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeidentifyRequest {
    pub parent: String,
    pub deidentify_config: DeidentifyConfig,
    pub inspect_config: InspectConfig,
    pub item: ContentItem,
}

/// File kinds the pipeline accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Csv,
}

impl FileKind {
    /// Classify a file by its extension (last dot-segment, case-insensitive)
    ///
    /// Returns `None` for anything outside the allow-list.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = name.rsplit('.').next().unwrap_or_default().to_lowercase();
        match ext.as_str() {
            "txt" => Some(FileKind::Text),
            "csv" => Some(FileKind::Csv),
            _ => None,
        }
    }

    /// The encoding tag sent with raw content of this kind
    pub fn bytes_type(self) -> BytesType {
        match self {
            FileKind::Text => BytesType::TextUtf8,
            FileKind::Csv => BytesType::Csv,
        }
    }
}

/// Bare object name from a storage URL (everything after the last `/`)
pub fn base_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Serde adapter for byte fields carried as base64 strings on the wire
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_allow_list() {
        assert_eq!(FileKind::from_name("report.txt"), Some(FileKind::Text));
        assert_eq!(FileKind::from_name("table.csv"), Some(FileKind::Csv));
        assert_eq!(FileKind::from_name("REPORT.TXT"), Some(FileKind::Text));
        assert_eq!(FileKind::from_name("data.pdf"), None);
        assert_eq!(FileKind::from_name("noextension"), None);
        assert_eq!(FileKind::from_name("archive.tar.gz"), None);
    }

    #[test]
    fn test_file_kind_bytes_type() {
        assert_eq!(FileKind::Text.bytes_type(), BytesType::TextUtf8);
        assert_eq!(FileKind::Csv.bytes_type(), BytesType::Csv);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("gs://doc-staging-141223/report.txt"), "report.txt");
        assert_eq!(base_name("test-file.txt"), "test-file.txt");
        assert_eq!(base_name("a/b/c.csv"), "c.csv");
    }

    #[test]
    fn test_completion_notification_job_name() {
        let notification = CompletionNotification::for_job("projects/p/dlpJobs/i-1");
        assert_eq!(notification.job_name().unwrap(), "projects/p/dlpJobs/i-1");

        let empty = CompletionNotification::default();
        assert!(matches!(
            empty.job_name(),
            Err(crate::PipelineError::MissingAttribute("DlpJobName"))
        ));
    }

    #[test]
    fn test_push_payload_roundtrip() {
        let payload = PushPayload::for_file("test_file.txt");
        assert_eq!(payload.file_name().unwrap().unwrap(), "test_file.txt");
    }

    #[test]
    fn test_push_payload_absent_data() {
        let payload = PushPayload::default();
        assert!(payload.file_name().unwrap().is_none());
    }

    #[test]
    fn test_push_payload_invalid_base64() {
        let payload = PushPayload {
            data: Some("not base64!!!".to_string()),
        };
        assert!(payload.file_name().is_err());
    }

    #[test]
    fn test_inspect_job_config_wire_shape() {
        let job = InspectJobConfig {
            inspect_config: InspectConfig {
                info_types: vec![InfoType::new("PHONE_NUMBER")],
                min_likelihood: Likelihood::Possible,
                limits: FindingLimits {
                    max_findings_per_request: 0,
                },
            },
            storage_config: StorageConfig::for_url("gs://doc-staging-141223/report.txt"),
            actions: vec![JobAction::publish_to(
                "projects/gcp-rest-deident/topics/new-document",
            )],
        };

        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"infoTypes\":[{\"name\":\"PHONE_NUMBER\"}]"));
        assert!(json.contains("\"minLikelihood\":\"POSSIBLE\""));
        assert!(json.contains("\"maxFindingsPerRequest\":0"));
        assert!(json.contains("\"url\":\"gs://doc-staging-141223/report.txt\""));
        assert!(json.contains("\"topic\":\"projects/gcp-rest-deident/topics/new-document\""));
    }

    #[test]
    fn test_byte_content_item_base64_wire_format() {
        let item = ByteContentItem {
            byte_type: BytesType::TextUtf8,
            data: b"teststuff".to_vec(),
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"TEXT_UTF8\""));
        assert!(json.contains("\"data\":\"dGVzdHN0dWZm\""));

        let parsed: ByteContentItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.data, b"teststuff");
        assert_eq!(parsed.byte_type, BytesType::TextUtf8);
    }

    #[test]
    fn test_deidentify_config_shape() {
        let config = DeidentifyConfig::character_mask('#', 25);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"maskingCharacter\":\"#\""));
        assert!(json.contains("\"numberToMask\":25"));
        assert!(json.contains("\"infoTypeTransformations\""));
    }

    #[test]
    fn test_dlp_job_deserialization() {
        let json = r#"{
            "name": "projects/gcp-rest-deident/dlpJobs/i-123",
            "state": "DONE",
            "inspectDetails": {
                "requestedOptions": {
                    "jobConfig": {
                        "inspectConfig": {
                            "infoTypes": [{"name": "EMAIL_ADDRESS"}],
                            "minLikelihood": "POSSIBLE",
                            "limits": {"maxFindingsPerRequest": 0}
                        },
                        "storageConfig": {
                            "cloudStorageOptions": {
                                "fileSet": {"url": "gs://doc-staging-141223/report.txt"}
                            }
                        },
                        "actions": []
                    }
                },
                "result": {
                    "infoTypeStats": [
                        {"infoType": {"name": "EMAIL_ADDRESS"}, "count": 3}
                    ]
                }
            }
        }"#;

        let job: DlpJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.state, JobState::Done);
        assert_eq!(job.source_url(), "gs://doc-staging-141223/report.txt");
        assert_eq!(job.findings().len(), 1);
        assert_eq!(job.findings()[0].count, 3);
        assert_eq!(job.findings()[0].info_type.name, "EMAIL_ADDRESS");
    }

    #[test]
    fn test_job_result_empty_findings_default() {
        let json = r#"{
            "name": "projects/p/dlpJobs/i-1",
            "inspectDetails": {
                "requestedOptions": {
                    "jobConfig": {
                        "inspectConfig": {
                            "infoTypes": [],
                            "minLikelihood": "POSSIBLE",
                            "limits": {"maxFindingsPerRequest": 0}
                        },
                        "storageConfig": {
                            "cloudStorageOptions": {"fileSet": {"url": "x.txt"}}
                        },
                        "actions": []
                    }
                }
            }
        }"#;

        let job: DlpJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.state, JobState::JobStateUnspecified);
        assert!(job.findings().is_empty());
    }
}
