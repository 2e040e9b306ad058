//! # doc-deident
//!
//! Event-driven document scanning, routing, and de-identification.
//!
//! ## Overview
//!
//! `doc-deident` implements a three-stage pipeline over managed cloud
//! services. Uploaded documents are scanned for sensitive personal
//! information by an external detection service, routed into sensitive or
//! non-sensitive storage areas based on the findings, and finally masked
//! in place. All content inspection, storage, and cross-stage signaling
//! is delegated to external services reached through narrow traits, so
//! backends can be swapped (REST clients, in-memory doubles) without
//! changing handler code.
//!
//! ## Quick Start
//!
//! ```rust
//! use doc_deident::provider::memory::{MemoryDlp, MemoryPublisher, MemoryStore};
//! use doc_deident::{Pipeline, PipelineConfig, UploadEvent};
//! use std::sync::Arc;
//!
//! # async fn example() -> doc_deident::Result<()> {
//! let pipeline = Pipeline::new(
//!     Arc::new(MemoryDlp::new()),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryPublisher::new()),
//!     PipelineConfig::default(),
//! );
//!
//! // A file landed in the staging bucket
//! pipeline
//!     .submit_inspect_job(&UploadEvent::new("report.txt"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Stages
//!
//! 1. **Job submission** — a staging upload event triggers an asynchronous
//!    inspection job naming the categories to match and a completion topic.
//! 2. **Result routing** — the completion notification triggers a single
//!    result fetch; the file moves to the sensitive area (with a
//!    notification) or the non-sensitive area.
//! 3. **De-identification** — the sensitive-document notification triggers
//!    an in-place character-mask rewrite of the stored file.
//!
//! ## Architecture
//!
//! - **DlpService / ObjectStore / Publisher** traits — the seams to the
//!   external services
//! - **Pipeline** — high-level handler entry points over any providers
//! - **PipelineConfig** — immutable configuration passed at construction
//! - **provider::gcp** — REST-backed production providers
//! - **provider::memory** — recording in-memory providers for tests

pub mod config;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod types;

// Re-export core types
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::Pipeline;
pub use provider::{DlpService, ObjectStore, Publisher};
pub use types::{
    ByteContentItem, BytesType, CompletionNotification, ContentItem, DeidentifyConfig,
    DeidentifyRequest, DlpJob, FileKind, InfoType, InfoTypeStats, InspectConfig,
    InspectJobConfig, JobState, Likelihood, PushPayload, UploadEvent,
};

// Re-export providers for convenience
pub use provider::gcp::{GcpClient, GcpConfig, GcpDlp, GcpPublisher, GcpStorage};
pub use provider::memory::{MemoryDlp, MemoryPublisher, MemoryStore};
