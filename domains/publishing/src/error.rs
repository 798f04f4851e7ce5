//! Error types for the publishing domain
//!
//! `PublishError` describes why a publish attempt ended in `Failed`; it is
//! recorded on the editor rather than returned. `EditorError` is returned
//! immediately for caller misuse and for operations whose outcome the
//! caller awaits directly (metadata fetch, delete).

use thiserror::Error;
use workshop_common::{PublishedFileId, StateError};
use workshop_platform::{PlatformError, ResultCode};

use crate::domain::validation::ValidationError;

/// Why a publish attempt failed
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PublishError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Error creating new file: {result} ({published_file_id})")]
    CreateFailed {
        result: ResultCode,
        published_file_id: PublishedFileId,
    },

    #[error("Platform rejected {step}: {source}")]
    Staging {
        step: &'static str,
        source: PlatformError,
    },

    #[error("Error publishing changes: {result} (needs legal agreement: {needs_legal_agreement})")]
    SubmitFailed {
        result: ResultCode,
        needs_legal_agreement: bool,
    },

    #[error("Transport failure during {operation}: {source}")]
    Transport {
        operation: &'static str,
        source: PlatformError,
    },

    #[error("Publish attempt abandoned before it completed")]
    Abandoned,
}

impl PublishError {
    /// Get the error code for logs and UI mapping
    pub fn error_code(&self) -> &'static str {
        match self {
            PublishError::Validation(_) => "VALIDATION_ERROR",
            PublishError::CreateFailed { .. } => "CREATE_FAILED",
            PublishError::Staging { .. } => "STAGING_REJECTED",
            PublishError::SubmitFailed { .. } => "SUBMIT_FAILED",
            PublishError::Transport { .. } => "TRANSPORT_FAILURE",
            PublishError::Abandoned => "ABANDONED",
        }
    }
}

/// Errors returned directly by editor operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditorError {
    #[error("A publish attempt is already in flight for item {0}")]
    AlreadyPublishing(PublishedFileId),

    #[error("A delete is already in flight for item {0}")]
    DeleteInFlight(PublishedFileId),

    #[error("Item type must be set when creating a new item")]
    MissingItemType,

    #[error("Item has not been created yet")]
    NotCreated,

    #[error("Item type cannot change once item {0} exists")]
    ItemTypeLocked(PublishedFileId),

    #[error("No preview at position {0}")]
    PreviewIndex(usize),

    #[error("State transition rejected: {0}")]
    State(#[from] StateError),

    #[error("Metadata query failed: {0}")]
    Query(#[source] PlatformError),

    #[error("Deleting item {id} failed: {result}")]
    DeleteFailed {
        id: PublishedFileId,
        result: ResultCode,
    },

    #[error("Deleting item {id} failed: {source}")]
    DeleteTransport {
        id: PublishedFileId,
        source: PlatformError,
    },
}
