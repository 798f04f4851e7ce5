//! Workshop entry point
//!
//! Binds an application id to a content platform and a metadata service,
//! and hands out editors for new or existing items.

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use workshop_common::{AppId, PublishedFileId, WorkshopConfig};
use workshop_platform::{ContentPlatform, ItemType, MetadataQuery};

use crate::editor::Editor;

#[derive(Clone)]
pub struct Workshop {
    app_id: AppId,
    platform: Arc<dyn ContentPlatform>,
    metadata: Arc<dyn MetadataQuery>,
    default_change_note: String,
}

impl fmt::Debug for Workshop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workshop")
            .field("app_id", &self.app_id)
            .field("default_change_note", &self.default_change_note)
            .finish()
    }
}

impl Workshop {
    pub fn new(
        app_id: AppId,
        platform: Arc<dyn ContentPlatform>,
        metadata: Arc<dyn MetadataQuery>,
    ) -> Self {
        Self {
            app_id,
            platform,
            metadata,
            default_change_note: String::new(),
        }
    }

    /// Build from loaded configuration; editors start with its default change note
    pub fn from_config(
        config: &WorkshopConfig,
        platform: Arc<dyn ContentPlatform>,
        metadata: Arc<dyn MetadataQuery>,
    ) -> Self {
        Self::new(config.app_id, platform, metadata)
            .with_default_change_note(config.default_change_note.clone())
    }

    /// Use one service for both publishing and metadata queries
    pub fn with_service<S>(app_id: AppId, service: Arc<S>) -> Self
    where
        S: ContentPlatform + MetadataQuery + 'static,
    {
        let platform: Arc<dyn ContentPlatform> = service.clone();
        let metadata: Arc<dyn MetadataQuery> = service;
        Self::new(app_id, platform, metadata)
    }

    pub fn with_default_change_note(mut self, note: impl Into<String>) -> Self {
        self.default_change_note = note.into();
        self
    }

    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    /// Editor for an item that will be created on the first publish
    pub fn create_item(&self, item_type: ItemType) -> Editor {
        debug!(app_id = %self.app_id, ?item_type, "Opening editor for new item");
        let editor = Editor::for_new_item(
            self.app_id,
            Arc::clone(&self.platform),
            Arc::clone(&self.metadata),
            item_type,
        );
        editor.set_change_note(self.default_change_note.clone());
        editor
    }

    /// Editor for an existing item; call `fetch_metadata` to load its fields
    pub fn edit_item(&self, id: PublishedFileId) -> Editor {
        debug!(app_id = %self.app_id, item_id = %id, "Opening editor for existing item");
        let editor = Editor::for_existing_item(
            self.app_id,
            Arc::clone(&self.platform),
            Arc::clone(&self.metadata),
            id,
        );
        editor.set_change_note(self.default_change_note.clone());
        editor
    }
}
