//! Mock Content Platform Implementation
//!
//! Programmable in-memory platform for testing publish workflows:
//! - `MockPlatform`: implements `ContentPlatform` and `MetadataQuery`, records every call
//! - `MockPlatformBehavior`: controls outcomes, legal flag, upload progress, rejected staging calls
//! - `MockGate`: holds async completions until a test releases them
//!
//! Submitted updates are applied to an in-memory item store, so a later
//! metadata query observes what an earlier publish wrote.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::watch;
use workshop_common::{AppId, OwnerId, PublishedFileId};

use crate::{
    ContentPlatform, CreateItemResult, ItemDetails, ItemType, MetadataQuery, PlatformError,
    PreviewDetails, PreviewType, ResultCode, SubmitItemResult, UpdateHandle, UpdateProgress,
    Visibility,
};

/// Owner assigned to items created through the mock
pub const MOCK_OWNER: OwnerId = OwnerId(76561197960287930);

/// First id handed out by `create_item`
pub const FIRST_MOCK_FILE_ID: u64 = 1000;

/// What outcome an async mock call should produce
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MockOutcome {
    /// Complete with `ResultCode::Ok`
    #[default]
    Complete,
    /// Complete with the given non-success status
    Fail(ResultCode),
    /// Fail to complete at all
    Transport,
}

/// Holds async mock calls until opened
#[derive(Debug)]
pub struct MockGate {
    open: watch::Sender<bool>,
}

impl Default for MockGate {
    fn default() -> Self {
        let (open, _) = watch::channel(true);
        Self { open }
    }
}

impl MockGate {
    /// Make subsequent calls wait
    pub fn close(&self) {
        self.open.send_replace(false);
    }

    /// Release every waiting call
    pub fn open(&self) {
        self.open.send_replace(true);
    }

    pub fn is_open(&self) -> bool {
        *self.open.borrow()
    }

    async fn pass(&self) {
        let mut rx = self.open.subscribe();
        // The sender lives as long as `self`, so this only returns once open.
        let _ = rx.wait_for(|open| *open).await.map(|_| ());
    }
}

/// Programmable behavior for the mock platform
#[derive(Debug, Clone)]
pub struct MockPlatformBehavior {
    pub create_outcome: Arc<RwLock<MockOutcome>>,
    pub submit_outcome: Arc<RwLock<MockOutcome>>,
    pub delete_outcome: Arc<RwLock<MockOutcome>>,
    pub query_outcome: Arc<RwLock<MockOutcome>>,
    pub needs_legal_agreement: Arc<RwLock<bool>>,
    pub progress: Arc<RwLock<UpdateProgress>>,
    pub rejected_operations: Arc<RwLock<BTreeSet<String>>>,
    pub create_gate: Arc<MockGate>,
    pub submit_gate: Arc<MockGate>,
    pub query_gate: Arc<MockGate>,
    pub delete_gate: Arc<MockGate>,
}

impl Default for MockPlatformBehavior {
    fn default() -> Self {
        Self {
            create_outcome: Arc::new(RwLock::new(MockOutcome::Complete)),
            submit_outcome: Arc::new(RwLock::new(MockOutcome::Complete)),
            delete_outcome: Arc::new(RwLock::new(MockOutcome::Complete)),
            query_outcome: Arc::new(RwLock::new(MockOutcome::Complete)),
            needs_legal_agreement: Arc::new(RwLock::new(false)),
            progress: Arc::new(RwLock::new(UpdateProgress::default())),
            rejected_operations: Arc::new(RwLock::new(BTreeSet::new())),
            create_gate: Arc::new(MockGate::default()),
            submit_gate: Arc::new(MockGate::default()),
            query_gate: Arc::new(MockGate::default()),
            delete_gate: Arc::new(MockGate::default()),
        }
    }
}

impl MockPlatformBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the outcome of `create_item`
    pub fn set_create_outcome(&self, outcome: MockOutcome) {
        *self.create_outcome.write().unwrap() = outcome;
    }

    /// Configure the outcome of `submit_item_update`
    pub fn set_submit_outcome(&self, outcome: MockOutcome) {
        *self.submit_outcome.write().unwrap() = outcome;
    }

    /// Configure the outcome of `delete_item`
    pub fn set_delete_outcome(&self, outcome: MockOutcome) {
        *self.delete_outcome.write().unwrap() = outcome;
    }

    /// Configure the outcome of `query`
    pub fn set_query_outcome(&self, outcome: MockOutcome) {
        *self.query_outcome.write().unwrap() = outcome;
    }

    /// Configure the legal agreement flag reported with create and submit results
    pub fn set_needs_legal_agreement(&self, needs: bool) {
        *self.needs_legal_agreement.write().unwrap() = needs;
    }

    /// Configure the upload snapshot returned by `item_update_progress`
    pub fn set_progress(&self, bytes_processed: u64, bytes_total: u64) {
        *self.progress.write().unwrap() = UpdateProgress {
            bytes_processed,
            bytes_total,
        };
    }

    /// Make the named staging operation (e.g. `set_item_title`) fail
    pub fn reject_operation(&self, operation: &str) {
        self.rejected_operations
            .write()
            .unwrap()
            .insert(operation.to_string());
    }

    /// Reset to default behavior
    pub fn reset(&self) {
        *self.create_outcome.write().unwrap() = MockOutcome::Complete;
        *self.submit_outcome.write().unwrap() = MockOutcome::Complete;
        *self.delete_outcome.write().unwrap() = MockOutcome::Complete;
        *self.query_outcome.write().unwrap() = MockOutcome::Complete;
        *self.needs_legal_agreement.write().unwrap() = false;
        *self.progress.write().unwrap() = UpdateProgress::default();
        self.rejected_operations.write().unwrap().clear();
        self.create_gate.open();
        self.submit_gate.open();
        self.query_gate.open();
        self.delete_gate.open();
    }

    pub fn get_create_outcome(&self) -> MockOutcome {
        *self.create_outcome.read().unwrap()
    }

    pub fn get_submit_outcome(&self) -> MockOutcome {
        *self.submit_outcome.read().unwrap()
    }

    pub fn get_delete_outcome(&self) -> MockOutcome {
        *self.delete_outcome.read().unwrap()
    }

    pub fn get_query_outcome(&self) -> MockOutcome {
        *self.query_outcome.read().unwrap()
    }

    pub fn get_needs_legal_agreement(&self) -> bool {
        *self.needs_legal_agreement.read().unwrap()
    }

    pub fn get_progress(&self) -> UpdateProgress {
        *self.progress.read().unwrap()
    }

    fn is_rejected(&self, operation: &str) -> bool {
        self.rejected_operations.read().unwrap().contains(operation)
    }
}

/// A recorded platform call for test assertions
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    CreateItem {
        app_id: AppId,
        item_type: ItemType,
    },
    StartItemUpdate {
        app_id: AppId,
        item: PublishedFileId,
        handle: UpdateHandle,
    },
    SetTitle(String),
    SetDescription(String),
    SetTags(Vec<String>),
    SetVisibility(Visibility),
    SetContent(PathBuf),
    SetPreview(PathBuf),
    AddPreviewFile {
        file: PathBuf,
        preview_type: PreviewType,
    },
    AddPreviewVideo(String),
    UpdatePreviewFile {
        index: u32,
        file: PathBuf,
    },
    UpdatePreviewVideo {
        index: u32,
        video_id: String,
    },
    RemovePreview(u32),
    SubmitItemUpdate {
        handle: UpdateHandle,
        change_note: String,
    },
    DeleteItem(PublishedFileId),
    Query {
        items: Vec<PublishedFileId>,
        include_previews: bool,
    },
}

impl RecordedCall {
    /// True for calls that queue a change against an update handle
    pub fn is_staging(&self) -> bool {
        matches!(
            self,
            Self::SetTitle(_)
                | Self::SetDescription(_)
                | Self::SetTags(_)
                | Self::SetVisibility(_)
                | Self::SetContent(_)
                | Self::SetPreview(_)
                | Self::AddPreviewFile { .. }
                | Self::AddPreviewVideo(_)
                | Self::UpdatePreviewFile { .. }
                | Self::UpdatePreviewVideo { .. }
                | Self::RemovePreview(_)
        )
    }
}

#[derive(Debug)]
struct StagedUpdate {
    item: PublishedFileId,
    changes: Vec<RecordedCall>,
}

/// Mock content platform with programmable behavior
#[derive(Debug, Clone)]
pub struct MockPlatform {
    behavior: Arc<MockPlatformBehavior>,
    history: Arc<Mutex<Vec<RecordedCall>>>,
    items: Arc<RwLock<HashMap<PublishedFileId, ItemDetails>>>,
    sessions: Arc<Mutex<HashMap<UpdateHandle, StagedUpdate>>>,
    next_file_id: Arc<AtomicU64>,
    next_handle: Arc<AtomicU64>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::with_behavior(Arc::new(MockPlatformBehavior::new()))
    }

    pub fn with_behavior(behavior: Arc<MockPlatformBehavior>) -> Self {
        Self {
            behavior,
            history: Arc::new(Mutex::new(Vec::new())),
            items: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_file_id: Arc::new(AtomicU64::new(FIRST_MOCK_FILE_ID)),
            next_handle: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Get the shared behavior for configuration
    pub fn behavior(&self) -> &Arc<MockPlatformBehavior> {
        &self.behavior
    }

    /// Get recorded platform calls
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.history
            .lock()
            .expect("history lock poisoned, prior test panicked")
            .clone()
    }

    /// Get recorded staging calls only
    pub fn staging_calls(&self) -> Vec<RecordedCall> {
        self.recorded_calls()
            .into_iter()
            .filter(RecordedCall::is_staging)
            .collect()
    }

    /// Clear history
    pub fn reset_history(&self) {
        self.history
            .lock()
            .expect("history lock poisoned, prior test panicked")
            .clear();
    }

    /// Seed the item store, as if the item had been published earlier
    pub fn insert_item(&self, details: ItemDetails) {
        self.items
            .write()
            .expect("items lock poisoned, prior test panicked")
            .insert(details.published_file_id, details);
    }

    /// Current stored state of an item
    pub fn item(&self, id: PublishedFileId) -> Option<ItemDetails> {
        self.items
            .read()
            .expect("items lock poisoned, prior test panicked")
            .get(&id)
            .cloned()
    }

    fn record(&self, call: RecordedCall) {
        if let Ok(mut history) = self.history.lock() {
            history.push(call);
        }
    }

    fn stage(
        &self,
        handle: UpdateHandle,
        operation: &str,
        call: RecordedCall,
    ) -> Result<(), PlatformError> {
        tracing::debug!(%handle, operation, "Mock platform: staging change");
        self.record(call.clone());

        if self.behavior.is_rejected(operation) {
            return Err(PlatformError::rejected(operation));
        }

        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| PlatformError::Transport(format!("sessions lock poisoned: {e}")))?;
        let session = sessions
            .get_mut(&handle)
            .ok_or(PlatformError::InvalidHandle(handle))?;
        session.changes.push(call);
        Ok(())
    }

    fn apply(&self, update: StagedUpdate) -> Result<(), PlatformError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| PlatformError::Transport(format!("items lock poisoned: {e}")))?;
        let item = items
            .entry(update.item)
            .or_insert_with(|| ItemDetails {
                published_file_id: update.item,
                owner_id: MOCK_OWNER,
                ..ItemDetails::default()
            });

        for change in update.changes {
            match change {
                RecordedCall::SetTitle(title) => item.title = title,
                RecordedCall::SetDescription(description) => item.description = description,
                RecordedCall::SetTags(tags) => item.tags = tags,
                RecordedCall::AddPreviewFile { file, preview_type } => {
                    let index = item.previews.len() as u32;
                    item.previews.push(PreviewDetails {
                        index,
                        url_or_video_id: file.display().to_string(),
                        original_file_name: file_name(&file),
                        preview_type,
                    });
                }
                RecordedCall::AddPreviewVideo(video_id) => {
                    let index = item.previews.len() as u32;
                    item.previews.push(PreviewDetails {
                        index,
                        url_or_video_id: video_id,
                        original_file_name: String::new(),
                        preview_type: PreviewType::YouTubeVideo,
                    });
                }
                RecordedCall::UpdatePreviewFile { index, file } => {
                    if let Some(preview) = item.previews.iter_mut().find(|p| p.index == index) {
                        preview.url_or_video_id = file.display().to_string();
                        preview.original_file_name = file_name(&file);
                    }
                }
                RecordedCall::UpdatePreviewVideo { index, video_id } => {
                    if let Some(preview) = item.previews.iter_mut().find(|p| p.index == index) {
                        preview.url_or_video_id = video_id;
                    }
                }
                RecordedCall::RemovePreview(index) => {
                    item.previews.retain(|p| p.index != index);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl ContentPlatform for MockPlatform {
    async fn create_item(
        &self,
        app_id: AppId,
        item_type: ItemType,
    ) -> Result<CreateItemResult, PlatformError> {
        tracing::info!(%app_id, ?item_type, "Mock platform: received create request");
        self.record(RecordedCall::CreateItem { app_id, item_type });

        self.behavior.create_gate.pass().await;

        let needs_legal_agreement = self.behavior.get_needs_legal_agreement();
        match self.behavior.get_create_outcome() {
            MockOutcome::Complete => {
                let published_file_id =
                    PublishedFileId(self.next_file_id.fetch_add(1, Ordering::SeqCst));
                self.insert_item(ItemDetails {
                    published_file_id,
                    owner_id: MOCK_OWNER,
                    ..ItemDetails::default()
                });
                Ok(CreateItemResult {
                    published_file_id,
                    needs_legal_agreement,
                    result: ResultCode::Ok,
                })
            }
            MockOutcome::Fail(result) => Ok(CreateItemResult {
                published_file_id: PublishedFileId::UNSET,
                needs_legal_agreement,
                result,
            }),
            MockOutcome::Transport => Err(PlatformError::Transport(
                "mock create_item never completed".to_string(),
            )),
        }
    }

    fn start_item_update(
        &self,
        app_id: AppId,
        item: PublishedFileId,
    ) -> Result<UpdateHandle, PlatformError> {
        let handle = UpdateHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.record(RecordedCall::StartItemUpdate {
            app_id,
            item,
            handle,
        });

        if self.behavior.is_rejected("start_item_update") {
            return Err(PlatformError::rejected("start_item_update"));
        }

        self.sessions
            .lock()
            .map_err(|e| PlatformError::Transport(format!("sessions lock poisoned: {e}")))?
            .insert(
                handle,
                StagedUpdate {
                    item,
                    changes: Vec::new(),
                },
            );
        Ok(handle)
    }

    fn set_item_title(&self, handle: UpdateHandle, title: &str) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "set_item_title",
            RecordedCall::SetTitle(title.to_string()),
        )
    }

    fn set_item_description(
        &self,
        handle: UpdateHandle,
        description: &str,
    ) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "set_item_description",
            RecordedCall::SetDescription(description.to_string()),
        )
    }

    fn set_item_tags(&self, handle: UpdateHandle, tags: &[String]) -> Result<(), PlatformError> {
        self.stage(handle, "set_item_tags", RecordedCall::SetTags(tags.to_vec()))
    }

    fn set_item_visibility(
        &self,
        handle: UpdateHandle,
        visibility: Visibility,
    ) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "set_item_visibility",
            RecordedCall::SetVisibility(visibility),
        )
    }

    fn set_item_content(&self, handle: UpdateHandle, folder: &Path) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "set_item_content",
            RecordedCall::SetContent(folder.to_path_buf()),
        )
    }

    fn set_item_preview(&self, handle: UpdateHandle, file: &Path) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "set_item_preview",
            RecordedCall::SetPreview(file.to_path_buf()),
        )
    }

    fn add_item_preview_file(
        &self,
        handle: UpdateHandle,
        file: &Path,
        preview_type: PreviewType,
    ) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "add_item_preview_file",
            RecordedCall::AddPreviewFile {
                file: file.to_path_buf(),
                preview_type,
            },
        )
    }

    fn add_item_preview_video(
        &self,
        handle: UpdateHandle,
        video_id: &str,
    ) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "add_item_preview_video",
            RecordedCall::AddPreviewVideo(video_id.to_string()),
        )
    }

    fn update_item_preview_file(
        &self,
        handle: UpdateHandle,
        index: u32,
        file: &Path,
    ) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "update_item_preview_file",
            RecordedCall::UpdatePreviewFile {
                index,
                file: file.to_path_buf(),
            },
        )
    }

    fn update_item_preview_video(
        &self,
        handle: UpdateHandle,
        index: u32,
        video_id: &str,
    ) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "update_item_preview_video",
            RecordedCall::UpdatePreviewVideo {
                index,
                video_id: video_id.to_string(),
            },
        )
    }

    fn remove_item_preview(&self, handle: UpdateHandle, index: u32) -> Result<(), PlatformError> {
        self.stage(
            handle,
            "remove_item_preview",
            RecordedCall::RemovePreview(index),
        )
    }

    async fn submit_item_update(
        &self,
        handle: UpdateHandle,
        change_note: &str,
    ) -> Result<SubmitItemResult, PlatformError> {
        tracing::info!(%handle, "Mock platform: received submit request");
        self.record(RecordedCall::SubmitItemUpdate {
            handle,
            change_note: change_note.to_string(),
        });

        self.behavior.submit_gate.pass().await;

        let session = self
            .sessions
            .lock()
            .map_err(|e| PlatformError::Transport(format!("sessions lock poisoned: {e}")))?
            .remove(&handle)
            .ok_or(PlatformError::InvalidHandle(handle))?;

        let needs_legal_agreement = self.behavior.get_needs_legal_agreement();
        match self.behavior.get_submit_outcome() {
            MockOutcome::Complete => {
                self.apply(session)?;
                Ok(SubmitItemResult {
                    needs_legal_agreement,
                    result: ResultCode::Ok,
                })
            }
            MockOutcome::Fail(result) => Ok(SubmitItemResult {
                needs_legal_agreement,
                result,
            }),
            MockOutcome::Transport => Err(PlatformError::Transport(
                "mock submit_item_update never completed".to_string(),
            )),
        }
    }

    fn item_update_progress(&self, _handle: UpdateHandle) -> UpdateProgress {
        self.behavior.get_progress()
    }

    async fn delete_item(&self, item: PublishedFileId) -> Result<ResultCode, PlatformError> {
        tracing::info!(item_id = %item, "Mock platform: received delete request");
        self.record(RecordedCall::DeleteItem(item));

        self.behavior.delete_gate.pass().await;

        match self.behavior.get_delete_outcome() {
            MockOutcome::Complete => {
                self.items
                    .write()
                    .map_err(|e| PlatformError::Transport(format!("items lock poisoned: {e}")))?
                    .remove(&item);
                Ok(ResultCode::Ok)
            }
            MockOutcome::Fail(result) => Ok(result),
            MockOutcome::Transport => Err(PlatformError::Transport(
                "mock delete_item never completed".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl MetadataQuery for MockPlatform {
    async fn query(
        &self,
        items: &BTreeSet<PublishedFileId>,
        include_previews: bool,
    ) -> Result<Vec<ItemDetails>, PlatformError> {
        tracing::debug!(count = items.len(), include_previews, "Mock platform: received query");
        self.record(RecordedCall::Query {
            items: items.iter().copied().collect(),
            include_previews,
        });

        // Snapshot before waiting so a held query reports the state it was issued against.
        let results: Vec<ItemDetails> = {
            let store = self
                .items
                .read()
                .map_err(|e| PlatformError::Transport(format!("items lock poisoned: {e}")))?;
            items
                .iter()
                .map(|id| {
                    let mut details = store
                        .get(id)
                        .cloned()
                        .unwrap_or_else(|| ItemDetails::missing(*id));
                    if !include_previews {
                        details.previews.clear();
                    }
                    details
                })
                .collect()
        };

        self.behavior.query_gate.pass().await;

        match self.behavior.get_query_outcome() {
            MockOutcome::Complete => Ok(results),
            MockOutcome::Fail(result) => Err(PlatformError::Transport(format!(
                "mock query failed: {result}"
            ))),
            MockOutcome::Transport => Err(PlatformError::Transport(
                "mock query never completed".to_string(),
            )),
        }
    }
}
