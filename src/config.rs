//! Pipeline configuration
//!
//! One immutable structure passed into [`Pipeline`](crate::Pipeline) at
//! construction time. The defaults are the production constants;
//! deployments override individual fields.

use crate::types::{FindingLimits, InfoType, InspectConfig, Likelihood};

/// Immutable pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Cloud project identifier
    pub project_id: String,

    /// Bucket newly uploaded, unclassified files land in
    pub staging_bucket: String,

    /// Bucket files with at least one finding are moved to
    pub sensitive_bucket: String,

    /// Bucket files with no findings are moved to
    pub nonsensitive_bucket: String,

    /// Topic the detection service notifies when an inspection job completes
    pub completion_topic: String,

    /// Topic notified for each newly stored sensitive document
    pub sensitive_topic: String,

    /// Minimum match confidence before a finding is reported
    pub min_likelihood: Likelihood,

    /// Maximum findings per request (0 = server maximum)
    pub max_findings: i32,

    /// Info-type categories to match
    pub info_types: Vec<String>,

    /// Character matched substrings are replaced with
    pub masking_character: char,

    /// Maximum characters masked per match
    pub number_to_mask: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_id: "gcp-rest-deident".to_string(),
            staging_bucket: "doc-staging-141223".to_string(),
            sensitive_bucket: "doc-sensitive-141223".to_string(),
            nonsensitive_bucket: "doc-safe-141223".to_string(),
            completion_topic: "new-document".to_string(),
            sensitive_topic: "new-sensitive-doc".to_string(),
            min_likelihood: Likelihood::Possible,
            max_findings: 0,
            info_types: vec![
                "FIRST_NAME".to_string(),
                "PHONE_NUMBER".to_string(),
                "EMAIL_ADDRESS".to_string(),
                "US_SOCIAL_SECURITY_NUMBER".to_string(),
            ],
            masking_character: '#',
            number_to_mask: 25,
        }
    }
}

impl PipelineConfig {
    /// Full project resource, e.g. `projects/gcp-rest-deident`
    pub fn parent(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    /// Fully-qualified staging URL for an object name
    pub fn staging_url(&self, file_name: &str) -> String {
        format!("gs://{}/{}", self.staging_bucket, file_name)
    }

    /// The inspect config shared by job submission and de-identification
    pub fn inspect_config(&self) -> InspectConfig {
        InspectConfig {
            info_types: self
                .info_types
                .iter()
                .map(|name| InfoType::new(name.as_str()))
                .collect(),
            min_likelihood: self.min_likelihood,
            limits: FindingLimits {
                max_findings_per_request: self.max_findings,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.project_id, "gcp-rest-deident");
        assert_eq!(config.staging_bucket, "doc-staging-141223");
        assert_eq!(config.sensitive_bucket, "doc-sensitive-141223");
        assert_eq!(config.nonsensitive_bucket, "doc-safe-141223");
        assert_eq!(config.completion_topic, "new-document");
        assert_eq!(config.sensitive_topic, "new-sensitive-doc");
        assert_eq!(config.min_likelihood, Likelihood::Possible);
        assert_eq!(config.max_findings, 0);
        assert_eq!(config.info_types.len(), 4);
        assert_eq!(config.masking_character, '#');
        assert_eq!(config.number_to_mask, 25);
    }

    #[test]
    fn test_parent_and_staging_url() {
        let config = PipelineConfig::default();
        assert_eq!(config.parent(), "projects/gcp-rest-deident");
        assert_eq!(
            config.staging_url("report.txt"),
            "gs://doc-staging-141223/report.txt"
        );
    }

    #[test]
    fn test_inspect_config_from_constants() {
        let config = PipelineConfig::default();
        let inspect = config.inspect_config();
        assert_eq!(
            inspect.info_types,
            vec![
                InfoType::new("FIRST_NAME"),
                InfoType::new("PHONE_NUMBER"),
                InfoType::new("EMAIL_ADDRESS"),
                InfoType::new("US_SOCIAL_SECURITY_NUMBER"),
            ]
        );
        assert_eq!(inspect.min_likelihood, Likelihood::Possible);
        assert_eq!(inspect.limits.max_findings_per_request, 0);
    }
}
