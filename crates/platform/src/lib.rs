//! Workshop Content Platform
//!
//! Contracts the publish workflow needs from the UGC hosting platform:
//! - `ContentPlatform`: item creation, update staging, submission, progress, deletion
//! - `MetadataQuery`: fetching existing item metadata by id
//! - `mock::MockPlatform`: programmable in-memory implementation of both for tests

pub mod mock;
pub mod types;

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;
use workshop_common::{AppId, PublishedFileId};

pub use types::{
    CreateItemResult, ItemDetails, ItemType, PreviewDetails, PreviewType, ResultCode,
    SubmitItemResult, UpdateHandle, UpdateProgress, Visibility,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("Platform transport failure: {0}")]
    Transport(String),

    #[error("Platform rejected {operation}")]
    Rejected { operation: String },

    #[error("Unknown update handle: {0}")]
    InvalidHandle(UpdateHandle),
}

impl PlatformError {
    pub fn rejected(operation: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
        }
    }
}

/// Content platform service trait for different backends
///
/// Async methods complete once the platform reports a result. `Err` from an
/// async method means the call itself failed to complete (transport), while a
/// completed call carries its own `ResultCode`. Staging methods are
/// synchronous and only queue changes against an open update handle; nothing
/// takes effect until `submit_item_update`.
#[async_trait::async_trait]
pub trait ContentPlatform: Send + Sync {
    /// Create a new, empty item of the given type.
    async fn create_item(
        &self,
        app_id: AppId,
        item_type: ItemType,
    ) -> Result<CreateItemResult, PlatformError>;

    /// Open an update session for an existing item.
    fn start_item_update(
        &self,
        app_id: AppId,
        item: PublishedFileId,
    ) -> Result<UpdateHandle, PlatformError>;

    fn set_item_title(&self, handle: UpdateHandle, title: &str) -> Result<(), PlatformError>;

    fn set_item_description(
        &self,
        handle: UpdateHandle,
        description: &str,
    ) -> Result<(), PlatformError>;

    fn set_item_tags(&self, handle: UpdateHandle, tags: &[String]) -> Result<(), PlatformError>;

    fn set_item_visibility(
        &self,
        handle: UpdateHandle,
        visibility: Visibility,
    ) -> Result<(), PlatformError>;

    /// Point the item's content at a local folder.
    fn set_item_content(&self, handle: UpdateHandle, folder: &Path) -> Result<(), PlatformError>;

    /// Set the primary preview image from a local file.
    fn set_item_preview(&self, handle: UpdateHandle, file: &Path) -> Result<(), PlatformError>;

    fn add_item_preview_file(
        &self,
        handle: UpdateHandle,
        file: &Path,
        preview_type: PreviewType,
    ) -> Result<(), PlatformError>;

    fn add_item_preview_video(
        &self,
        handle: UpdateHandle,
        video_id: &str,
    ) -> Result<(), PlatformError>;

    fn update_item_preview_file(
        &self,
        handle: UpdateHandle,
        index: u32,
        file: &Path,
    ) -> Result<(), PlatformError>;

    fn update_item_preview_video(
        &self,
        handle: UpdateHandle,
        index: u32,
        video_id: &str,
    ) -> Result<(), PlatformError>;

    fn remove_item_preview(&self, handle: UpdateHandle, index: u32) -> Result<(), PlatformError>;

    /// Submit everything staged on `handle`.
    async fn submit_item_update(
        &self,
        handle: UpdateHandle,
        change_note: &str,
    ) -> Result<SubmitItemResult, PlatformError>;

    /// Snapshot of the upload progress for a submitted update.
    fn item_update_progress(&self, handle: UpdateHandle) -> UpdateProgress;

    /// Delete a published item.
    async fn delete_item(&self, item: PublishedFileId) -> Result<ResultCode, PlatformError>;
}

/// Metadata query service trait
#[async_trait::async_trait]
pub trait MetadataQuery: Send + Sync {
    /// Fetch metadata for the given items. Unknown ids come back with a zero owner.
    async fn query(
        &self,
        items: &BTreeSet<PublishedFileId>,
        include_previews: bool,
    ) -> Result<Vec<ItemDetails>, PlatformError>;
}
