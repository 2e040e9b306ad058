//! Error types for doc-deident

use thiserror::Error;

/// Errors that can occur in the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Detection service call failure
    #[error("Detection service error during {operation}: {reason}")]
    Detection {
        operation: String,
        reason: String,
    },

    /// Object store call failure
    #[error("Storage error on '{bucket}/{object}': {reason}")]
    Storage {
        bucket: String,
        object: String,
        reason: String,
    },

    /// Notification publish failure
    #[error("Failed to publish to topic '{topic}': {reason}")]
    Publish {
        topic: String,
        reason: String,
    },

    /// A required trigger attribute was absent
    #[error("Notification is missing the '{0}' attribute")]
    MissingAttribute(&'static str),

    /// Trigger payload could not be decoded
    #[error("Invalid notification payload: {0}")]
    Payload(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport failure (real providers)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
