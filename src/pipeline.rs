//! The three-stage document pipeline
//!
//! `Pipeline` owns the collaborator providers and exposes one entry point
//! per stage. Each handler is stateless; chaining between stages happens
//! entirely through the external platform (storage events and push
//! subscriptions), which also owns delivery, ordering, and retries.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::provider::{DlpService, ObjectStore, Publisher};
use crate::types::{
    base_name, ByteContentItem, CompletionNotification, ContentItem, DeidentifyConfig,
    DeidentifyRequest, FileKind, InspectJobConfig, JobAction, PushPayload, StorageConfig,
    UploadEvent,
};
use bytes::Bytes;
use std::sync::Arc;

/// Document scanning, routing, and de-identification over pluggable providers
pub struct Pipeline {
    dlp: Arc<dyn DlpService>,
    store: Arc<dyn ObjectStore>,
    publisher: Arc<dyn Publisher>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline from providers and an immutable configuration
    pub fn new(
        dlp: Arc<dyn DlpService>,
        store: Arc<dyn ObjectStore>,
        publisher: Arc<dyn Publisher>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            dlp,
            store,
            publisher,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stage 1 — submit an inspection job for a newly staged file
    ///
    /// Files outside the extension allow-list are logged and skipped.
    /// A submission failure is logged and swallowed: the triggering event
    /// is considered handled either way, and nothing retries it.
    pub async fn submit_inspect_job(&self, event: &UploadEvent) -> Result<()> {
        let file_name = &event.name;
        tracing::info!(file = %file_name, "Upload event received");

        if FileKind::from_name(file_name).is_none() {
            tracing::warn!(
                file = %file_name,
                "Unsupported file extension, must be .txt or .csv"
            );
            return Ok(());
        }

        let completion_topic = self
            .publisher
            .topic_path(&self.config.project_id, &self.config.completion_topic);

        let job = InspectJobConfig {
            inspect_config: self.config.inspect_config(),
            storage_config: StorageConfig::for_url(self.config.staging_url(file_name)),
            actions: vec![JobAction::publish_to(completion_topic)],
        };

        match self.dlp.create_inspect_job(&self.config.parent(), &job).await {
            Ok(handle) => {
                tracing::info!(job = %handle, file = %file_name, "Inspection job created");
            }
            Err(e) => {
                tracing::warn!(
                    file = %file_name,
                    error = %e,
                    "Inspection job submission failed, event dropped"
                );
            }
        }

        Ok(())
    }

    /// Stage 2 — route a scanned file on job completion
    ///
    /// Fetches the finished job once (the completion notification implies
    /// it is done), then moves the file out of staging: into the sensitive
    /// area with a notification when findings exist, into the non-sensitive
    /// area silently otherwise. Provider errors propagate to the caller.
    pub async fn route_findings(&self, notification: &CompletionNotification) -> Result<()> {
        let job_name = notification.job_name()?;
        tracing::info!(job = %job_name, "Completion notification received");

        let job = self.dlp.get_job(job_name).await?;
        tracing::info!(job = %job.name, state = %job.state, "Fetched inspection job");

        let file_name = base_name(job.source_url()).to_string();
        let findings = job.findings();

        if !findings.is_empty() {
            let topic = self
                .publisher
                .topic_path(&self.config.project_id, &self.config.sensitive_topic);

            // Each finding entry triggers its own move and notification.
            for stat in findings {
                tracing::info!(
                    count = stat.count,
                    info_type = %stat.info_type.name,
                    "Found sensitive data instances"
                );
                tracing::info!(file = %file_name, "Moving item to sensitive bucket");
                self.store
                    .copy(
                        &self.config.staging_bucket,
                        &self.config.sensitive_bucket,
                        &file_name,
                    )
                    .await?;
                self.store
                    .delete(&self.config.staging_bucket, &file_name)
                    .await?;

                tracing::info!(topic = %topic, "Publishing sensitive document notification");
                self.publisher
                    .publish(&topic, file_name.clone().into_bytes())
                    .await?;
            }
        } else {
            tracing::info!(file = %file_name, "Moving item to non-sensitive bucket");
            self.store
                .copy(
                    &self.config.staging_bucket,
                    &self.config.nonsensitive_bucket,
                    &file_name,
                )
                .await?;
            self.store
                .delete(&self.config.staging_bucket, &file_name)
                .await?;
            tracing::info!(file = %file_name, "Finished");
        }

        Ok(())
    }

    /// Stage 3 — mask sensitive content of a relocated file in place
    ///
    /// The payload carries the base64-encoded name of a file already in
    /// the sensitive area. An absent payload or an extension outside the
    /// allow-list is logged and skipped. The bytes returned by the
    /// detection service are written back verbatim over the same object.
    pub async fn deidentify_document(&self, payload: &PushPayload) -> Result<()> {
        let Some(file_name) = payload.file_name()? else {
            return Ok(());
        };
        tracing::info!(file = %file_name, "De-identification requested");

        let Some(kind) = FileKind::from_name(&file_name) else {
            tracing::warn!(
                file = %file_name,
                "Unsupported file extension, must be .txt or .csv"
            );
            return Ok(());
        };
        tracing::debug!(file = %file_name, kind = ?kind.bytes_type(), "Detected file type");

        let data = self
            .store
            .download(&self.config.sensitive_bucket, &file_name)
            .await?;
        tracing::info!(
            file = %file_name,
            bucket = %self.config.sensitive_bucket,
            bytes = data.len(),
            "Retrieved file from sensitive bucket"
        );

        let request = DeidentifyRequest {
            parent: self.config.parent(),
            deidentify_config: DeidentifyConfig::character_mask(
                self.config.masking_character,
                self.config.number_to_mask,
            ),
            inspect_config: self.config.inspect_config(),
            item: ContentItem {
                byte_item: ByteContentItem {
                    byte_type: kind.bytes_type(),
                    data: data.to_vec(),
                },
            },
        };

        let masked = self.dlp.deidentify(&request).await?;
        self.store
            .upload(
                &self.config.sensitive_bucket,
                &file_name,
                Bytes::from(masked.data),
            )
            .await?;
        tracing::info!(file = %file_name, "De-identified content written back");

        Ok(())
    }
}
