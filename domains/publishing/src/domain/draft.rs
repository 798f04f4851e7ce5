//! Locally edited item fields
//!
//! `None` for an optional field means "leave it unchanged on the platform".

use std::collections::BTreeSet;
use std::path::PathBuf;

use workshop_platform::Visibility;

use crate::domain::preview::ItemPreview;

/// Editable state of an item, snapshotted at the start of each publish attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Local folder uploaded as the item's content
    pub folder: Option<PathBuf>,
    pub primary_preview_image: Option<PathBuf>,
    pub tags: BTreeSet<String>,
    pub visibility: Option<Visibility>,
    pub previews: Vec<ItemPreview>,
    pub change_note: String,
}

impl ItemDraft {
    /// Replace the tag set
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
    }

    /// Drop pending preview changes the platform has accepted
    pub(crate) fn commit_previews(&mut self) {
        self.previews = std::mem::take(&mut self.previews)
            .into_iter()
            .filter_map(ItemPreview::into_committed)
            .collect();
    }
}
