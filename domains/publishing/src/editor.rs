//! Item editor: drives one item through creation, staging, and submission
//!
//! An `Editor` is a cheap handle over shared state. Clone it to poll
//! `progress()` from a UI task while another task awaits `publish()`.
//! The state lock is never held across an `.await`.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use workshop_common::{AppId, PublishedFileId};
use workshop_platform::{
    ContentPlatform, ItemType, MetadataQuery, PreviewType, UpdateHandle, UpdateProgress,
    Visibility,
};

use crate::domain::draft::ItemDraft;
use crate::domain::preview::{ItemPreview, PreviewAction};
use crate::domain::staging::StagingPlan;
use crate::domain::state::{PublishEvent, PublishState, PublishStateMachine};
use crate::error::{EditorError, PublishError};

/// Outcome of a metadata fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataStatus {
    /// Local fields were replaced with the platform's
    Populated,
    /// The item was deleted or never existed; local fields untouched
    Missing,
    /// A later fetch was issued before this one completed; result dropped
    Superseded,
}

struct EditorState {
    id: PublishedFileId,
    item_type: Option<ItemType>,
    draft: ItemDraft,
    phase: PublishState,
    update_handle: Option<UpdateHandle>,
    error: Option<PublishError>,
    needs_legal_agreement: bool,
    metadata_populated: bool,
    fetch_generation: u64,
    deleting: bool,
}

impl EditorState {
    fn advance(&mut self, event: PublishEvent) {
        match PublishStateMachine::transition(self.phase, event) {
            Ok(next) => {
                debug!(item_id = %self.id, from = %self.phase, to = %next, "Publish state changed");
                self.phase = next;
            }
            Err(err) => {
                warn!(item_id = %self.id, error = %err, "Ignoring invalid publish transition");
            }
        }
    }

    fn fail(&mut self, error: PublishError) {
        warn!(
            item_id = %self.id,
            code = error.error_code(),
            error = %error,
            "Publish attempt failed"
        );
        self.error = Some(error);
        self.update_handle = None;
        self.advance(PublishEvent::Failure);
    }
}

/// Editor for one workshop item
#[derive(Clone)]
pub struct Editor {
    app_id: AppId,
    platform: Arc<dyn ContentPlatform>,
    metadata: Arc<dyn MetadataQuery>,
    state: Arc<Mutex<EditorState>>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Editor")
            .field("app_id", &self.app_id)
            .field("id", &state.id)
            .field("item_type", &state.item_type)
            .field("phase", &state.phase)
            .finish()
    }
}

impl Editor {
    /// Editor for an item that does not exist yet.
    ///
    /// There is nothing remote to fetch, so metadata counts as populated.
    pub fn for_new_item(
        app_id: AppId,
        platform: Arc<dyn ContentPlatform>,
        metadata: Arc<dyn MetadataQuery>,
        item_type: ItemType,
    ) -> Self {
        Self::with_state(
            app_id,
            platform,
            metadata,
            PublishedFileId::UNSET,
            Some(item_type),
            true,
        )
    }

    /// Editor for an item already on the platform; call `fetch_metadata` to load it.
    pub fn for_existing_item(
        app_id: AppId,
        platform: Arc<dyn ContentPlatform>,
        metadata: Arc<dyn MetadataQuery>,
        id: PublishedFileId,
    ) -> Self {
        Self::with_state(app_id, platform, metadata, id, None, false)
    }

    fn with_state(
        app_id: AppId,
        platform: Arc<dyn ContentPlatform>,
        metadata: Arc<dyn MetadataQuery>,
        id: PublishedFileId,
        item_type: Option<ItemType>,
        metadata_populated: bool,
    ) -> Self {
        Self {
            app_id,
            platform,
            metadata,
            state: Arc::new(Mutex::new(EditorState {
                id,
                item_type,
                draft: ItemDraft::default(),
                phase: PublishState::Idle,
                update_handle: None,
                error: None,
                needs_legal_agreement: false,
                metadata_populated,
                fetch_generation: 0,
                deleting: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    /// Item id, `PublishedFileId::UNSET` until created
    pub fn id(&self) -> PublishedFileId {
        self.lock().id
    }

    pub fn item_type(&self) -> Option<ItemType> {
        self.lock().item_type
    }

    pub fn state(&self) -> PublishState {
        self.lock().phase
    }

    pub fn is_publishing(&self) -> bool {
        self.lock().phase.is_publishing()
    }

    /// Description of the last failure, cleared when a new attempt starts
    pub fn error(&self) -> Option<String> {
        self.lock().error.as_ref().map(ToString::to_string)
    }

    pub fn failure(&self) -> Option<PublishError> {
        self.lock().error.clone()
    }

    /// The platform wants the account to accept the workshop legal agreement
    pub fn needs_legal_agreement(&self) -> bool {
        self.lock().needs_legal_agreement
    }

    pub fn is_metadata_populated(&self) -> bool {
        self.lock().metadata_populated
    }

    /// Overall progress of the current attempt in `[0.0, 1.0]`.
    ///
    /// 1.0 when nothing is in flight, 0.0 until the update is submitted,
    /// then the live upload fraction.
    pub fn progress(&self) -> f64 {
        let handle = {
            let state = self.lock();
            if !state.phase.is_publishing() {
                return 1.0;
            }
            match (state.phase, state.update_handle) {
                (PublishState::Submitting, Some(handle)) => handle,
                _ => return 0.0,
            }
        };
        self.platform.item_update_progress(handle).fraction()
    }

    /// Bytes uploaded so far; 0 unless an update submission is in flight
    pub fn bytes_uploaded(&self) -> u64 {
        self.upload_snapshot()
            .map(|progress| progress.bytes_processed)
            .unwrap_or(0)
    }

    /// Bytes to upload in total; 0 unless an update submission is in flight
    pub fn bytes_total(&self) -> u64 {
        self.upload_snapshot()
            .map(|progress| progress.bytes_total)
            .unwrap_or(0)
    }

    fn upload_snapshot(&self) -> Option<UpdateProgress> {
        let handle = {
            let state = self.lock();
            match (state.phase, state.update_handle) {
                (PublishState::Submitting, Some(handle)) => handle,
                _ => return None,
            }
        };
        Some(self.platform.item_update_progress(handle))
    }

    // ------------------------------------------------------------------------
    // Draft
    // ------------------------------------------------------------------------

    /// Snapshot of the locally edited fields
    pub fn draft(&self) -> ItemDraft {
        self.lock().draft.clone()
    }

    /// Edit the draft in place; changes apply to the next publish attempt
    pub fn edit_draft<R>(&self, edit: impl FnOnce(&mut ItemDraft) -> R) -> R {
        edit(&mut self.lock().draft)
    }

    pub fn title(&self) -> Option<String> {
        self.lock().draft.title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().draft.title = Some(title.into());
    }

    pub fn description(&self) -> Option<String> {
        self.lock().draft.description.clone()
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.lock().draft.description = Some(description.into());
    }

    pub fn folder(&self) -> Option<PathBuf> {
        self.lock().draft.folder.clone()
    }

    pub fn set_folder(&self, folder: impl Into<PathBuf>) {
        self.lock().draft.folder = Some(folder.into());
    }

    pub fn primary_preview_image(&self) -> Option<PathBuf> {
        self.lock().draft.primary_preview_image.clone()
    }

    pub fn set_primary_preview_image(&self, file: impl Into<PathBuf>) {
        self.lock().draft.primary_preview_image = Some(file.into());
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.lock().draft.visibility
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        self.lock().draft.visibility = Some(visibility);
    }

    pub fn tags(&self) -> Vec<String> {
        self.lock().draft.tags.iter().cloned().collect()
    }

    pub fn set_tags<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().draft.set_tags(tags);
    }

    /// Returns false if the tag was already present
    pub fn add_tag(&self, tag: impl Into<String>) -> bool {
        self.lock().draft.tags.insert(tag.into())
    }

    pub fn remove_tag(&self, tag: &str) -> bool {
        self.lock().draft.tags.remove(tag)
    }

    pub fn change_note(&self) -> String {
        self.lock().draft.change_note.clone()
    }

    pub fn set_change_note(&self, note: impl Into<String>) {
        self.lock().draft.change_note = note.into();
    }

    /// Set the type for a new item; locked once the platform has created it
    pub fn set_item_type(&self, item_type: ItemType) -> Result<(), EditorError> {
        let mut state = self.lock();
        if !state.id.is_unset() {
            return Err(EditorError::ItemTypeLocked(state.id));
        }
        state.item_type = Some(item_type);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Previews
    // ------------------------------------------------------------------------

    pub fn previews(&self) -> Vec<ItemPreview> {
        self.lock().draft.previews.clone()
    }

    pub fn set_previews(&self, previews: Vec<ItemPreview>) {
        self.lock().draft.previews = previews;
    }

    /// Queue a new preview (file path, or video id for video types)
    pub fn add_preview(&self, content: impl Into<String>, preview_type: PreviewType) {
        self.lock()
            .draft
            .previews
            .push(ItemPreview::new(content, preview_type));
    }

    /// Mark the preview at `position` for removal on the next submit
    pub fn remove_preview(&self, position: usize) -> Result<(), EditorError> {
        self.with_preview(position, |preview| Ok(preview.remove()?))
    }

    /// Replace the content of the preview at `position` on the next submit
    pub fn update_preview(
        &self,
        position: usize,
        content: impl Into<String>,
    ) -> Result<(), EditorError> {
        let content = content.into();
        self.with_preview(position, |preview| Ok(preview.update_content(content)?))
    }

    /// Drop a preview that was added locally and never submitted
    pub fn discard_preview(&self, position: usize) -> Result<ItemPreview, EditorError> {
        let mut state = self.lock();
        let preview = state
            .draft
            .previews
            .get(position)
            .ok_or(EditorError::PreviewIndex(position))?;
        if preview.pending_action() != PreviewAction::Create {
            return Err(EditorError::State(workshop_common::StateError::invalid(
                preview.pending_action(),
                "discard",
            )));
        }
        Ok(state.draft.previews.remove(position))
    }

    fn with_preview(
        &self,
        position: usize,
        apply: impl FnOnce(&mut ItemPreview) -> Result<(), EditorError>,
    ) -> Result<(), EditorError> {
        let mut state = self.lock();
        let preview = state
            .draft
            .previews
            .get_mut(position)
            .ok_or(EditorError::PreviewIndex(position))?;
        apply(preview)
    }

    // ------------------------------------------------------------------------
    // Remote operations
    // ------------------------------------------------------------------------

    /// Load title, description, tags, and previews from the platform.
    ///
    /// Issuing another fetch before this one completes supersedes it.
    pub async fn fetch_metadata(&self) -> Result<MetadataStatus, EditorError> {
        let (id, generation) = {
            let mut state = self.lock();
            if state.id.is_unset() {
                return Err(EditorError::NotCreated);
            }
            state.metadata_populated = false;
            state.fetch_generation += 1;
            (state.id, state.fetch_generation)
        };

        info!(item_id = %id, "Fetching item metadata");
        let result = self
            .metadata
            .query(&BTreeSet::from([id]), true)
            .await;

        let mut state = self.lock();
        if state.fetch_generation != generation || state.id != id {
            debug!(item_id = %id, generation, "Discarding superseded metadata result");
            return Ok(MetadataStatus::Superseded);
        }

        let items = result.map_err(EditorError::Query)?;
        state.metadata_populated = true;

        let Some(details) = items
            .into_iter()
            .find(|details| details.published_file_id == id && details.exists())
        else {
            warn!(item_id = %id, "Item was deleted or does not exist");
            return Ok(MetadataStatus::Missing);
        };

        state.draft.title = Some(details.title);
        state.draft.description = Some(details.description);
        state.draft.set_tags(details.tags);
        state.draft.previews = details.previews.into_iter().map(ItemPreview::from).collect();

        info!(item_id = %id, previews = state.draft.previews.len(), "Item metadata populated");
        Ok(MetadataStatus::Populated)
    }

    /// Create the item if needed, then stage and submit all local changes.
    ///
    /// Returns the terminal state reached. A failed attempt is not an `Err`:
    /// inspect `error()` / `failure()`. `Err` is reserved for calls that
    /// could not start an attempt at all.
    pub async fn publish(&self) -> Result<PublishState, EditorError> {
        let (id, create_as) = {
            let mut state = self.lock();
            if state.phase.is_publishing() {
                return Err(EditorError::AlreadyPublishing(state.id));
            }
            if state.deleting {
                return Err(EditorError::DeleteInFlight(state.id));
            }

            let create_as = if state.id.is_unset() {
                Some(state.item_type.ok_or(EditorError::MissingItemType)?)
            } else {
                None
            };
            let event = match create_as {
                Some(_) => PublishEvent::CreateRequested,
                None => PublishEvent::UpdateRequested,
            };

            state.phase = PublishStateMachine::transition(state.phase, event)?;
            state.error = None;
            state.update_handle = None;
            (state.id, create_as)
        };

        let _abandon = AbandonGuard {
            state: Arc::clone(&self.state),
        };

        let id = match create_as {
            Some(item_type) => match self.create_item(item_type).await {
                Some(id) => id,
                None => return Ok(self.state()),
            },
            None => id,
        };

        self.publish_changes(id).await;
        Ok(self.state())
    }

    async fn create_item(&self, item_type: ItemType) -> Option<PublishedFileId> {
        info!(app_id = %self.app_id, ?item_type, "Creating workshop item");
        let outcome = self.platform.create_item(self.app_id, item_type).await;

        let mut state = self.lock();
        match outcome {
            Ok(created) => {
                state.needs_legal_agreement = created.needs_legal_agreement;
                if created.result.is_ok() && !created.published_file_id.is_unset() {
                    state.id = created.published_file_id;
                    info!(item_id = %state.id, "Workshop item created");
                    state.advance(PublishEvent::ItemCreated);
                    Some(state.id)
                } else {
                    state.fail(PublishError::CreateFailed {
                        result: created.result,
                        published_file_id: created.published_file_id,
                    });
                    None
                }
            }
            Err(source) => {
                state.fail(PublishError::Transport {
                    operation: "create_item",
                    source,
                });
                None
            }
        }
    }

    async fn publish_changes(&self, id: PublishedFileId) {
        let draft = self.draft();

        let plan = match StagingPlan::build(&draft) {
            Ok(plan) => plan,
            Err(err) => {
                self.lock().fail(err.into());
                return;
            }
        };

        let handle = match self.platform.start_item_update(self.app_id, id) {
            Ok(handle) => handle,
            Err(source) => {
                self.lock().fail(PublishError::Staging {
                    step: "start_item_update",
                    source,
                });
                return;
            }
        };

        debug!(item_id = %id, %handle, steps = plan.len(), "Staging item update");
        if let Err(err) = plan.stage(self.platform.as_ref(), handle) {
            self.lock().fail(err);
            return;
        }

        {
            let mut state = self.lock();
            state.update_handle = Some(handle);
            state.advance(PublishEvent::Submitted);
        }

        info!(item_id = %id, %handle, "Submitting item update");
        let outcome = self
            .platform
            .submit_item_update(handle, &draft.change_note)
            .await;

        let mut state = self.lock();
        match outcome {
            Ok(submitted) => {
                state.needs_legal_agreement = submitted.needs_legal_agreement;
                if submitted.result.is_ok() {
                    state.update_handle = None;
                    state.advance(PublishEvent::Success);
                    if state.draft.previews == draft.previews {
                        state.draft.commit_previews();
                    } else {
                        debug!(item_id = %id, "Previews edited during submit; keeping local changes");
                    }
                    info!(
                        item_id = %id,
                        needs_legal_agreement = submitted.needs_legal_agreement,
                        "Item update published"
                    );
                } else {
                    state.fail(PublishError::SubmitFailed {
                        result: submitted.result,
                        needs_legal_agreement: submitted.needs_legal_agreement,
                    });
                }
            }
            Err(source) => state.fail(PublishError::Transport {
                operation: "submit_item_update",
                source,
            }),
        }
    }

    /// Delete the item from the platform.
    ///
    /// The local id is only cleared once the platform confirms. Deleting an
    /// item that was never created is a no-op. No publish can start until
    /// the delete completes.
    pub async fn delete(&self) -> Result<(), EditorError> {
        let id = {
            let mut state = self.lock();
            if state.phase.is_publishing() {
                return Err(EditorError::AlreadyPublishing(state.id));
            }
            if state.deleting {
                return Err(EditorError::DeleteInFlight(state.id));
            }
            if state.id.is_unset() {
                debug!("Delete requested for an item that was never created");
                return Ok(());
            }
            state.deleting = true;
            state.id
        };

        let _deleting = DeleteGuard {
            state: Arc::clone(&self.state),
        };

        info!(item_id = %id, "Deleting workshop item");
        match self.platform.delete_item(id).await {
            Ok(result) if result.is_ok() => {
                let mut state = self.lock();
                if state.id == id {
                    state.id = PublishedFileId::UNSET;
                    state.metadata_populated = true;
                }
                info!(item_id = %id, "Workshop item deleted");
                Ok(())
            }
            Ok(result) => {
                warn!(item_id = %id, %result, "Platform refused to delete item");
                Err(EditorError::DeleteFailed { id, result })
            }
            Err(source) => {
                warn!(item_id = %id, error = %source, "Delete request failed");
                Err(EditorError::DeleteTransport { id, source })
            }
        }
    }
}

/// Marks the attempt failed if the `publish()` future is dropped mid-flight
struct AbandonGuard {
    state: Arc<Mutex<EditorState>>,
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.phase.is_publishing() {
            state.fail(PublishError::Abandoned);
        }
    }
}

/// Clears the in-flight delete marker however `delete()` ends
struct DeleteGuard {
    state: Arc<Mutex<EditorState>>,
}

impl Drop for DeleteGuard {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .deleting = false;
    }
}
