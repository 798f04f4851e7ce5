//! Preview asset change tracking
//!
//! A preview either exists only locally (added by the author, not yet
//! submitted) or already exists on the platform at a known index. Which
//! mutations are allowed depends on that origin, so it is modelled as a
//! tagged union rather than a flat action flag.

use serde::{Deserialize, Serialize};
use std::fmt;

use workshop_common::StateError;
use workshop_platform::{PreviewDetails, PreviewType};

/// Pending change derived from a preview's origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewAction {
    None,
    Create,
    Update,
    Remove,
}

impl fmt::Display for PreviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Change queued against a preview that already exists on the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    None,
    /// Replace the content with a new file path or video id
    Update(String),
    Remove,
}

/// Where a preview came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOrigin {
    /// Added locally, created on the next submit
    LocalNew { content: String },
    /// Reported by the platform at `index`
    Existing {
        index: u32,
        content: String,
        original_file_name: String,
        change: PendingChange,
    },
}

/// One preview image or video attached to an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPreview {
    preview_type: PreviewType,
    origin: PreviewOrigin,
}

impl ItemPreview {
    /// A new preview to add on the next submit.
    ///
    /// `content` is a local file path, or a video id for video preview types.
    pub fn new(content: impl Into<String>, preview_type: PreviewType) -> Self {
        Self {
            preview_type,
            origin: PreviewOrigin::LocalNew {
                content: content.into(),
            },
        }
    }

    /// A preview that already exists on the platform.
    pub fn existing(
        index: u32,
        content: impl Into<String>,
        original_file_name: impl Into<String>,
        preview_type: PreviewType,
    ) -> Self {
        Self {
            preview_type,
            origin: PreviewOrigin::Existing {
                index,
                content: content.into(),
                original_file_name: original_file_name.into(),
                change: PendingChange::None,
            },
        }
    }

    pub fn preview_type(&self) -> PreviewType {
        self.preview_type
    }

    pub fn origin(&self) -> &PreviewOrigin {
        &self.origin
    }

    /// Platform index, only known for existing previews
    pub fn index(&self) -> Option<u32> {
        match &self.origin {
            PreviewOrigin::LocalNew { .. } => None,
            PreviewOrigin::Existing { index, .. } => Some(*index),
        }
    }

    /// Content the next submit would publish (pending update wins over current)
    pub fn content_reference(&self) -> &str {
        match &self.origin {
            PreviewOrigin::LocalNew { content } => content,
            PreviewOrigin::Existing {
                change: PendingChange::Update(pending),
                ..
            } => pending,
            PreviewOrigin::Existing { content, .. } => content,
        }
    }

    /// Content as currently published
    pub fn published_content(&self) -> Option<&str> {
        match &self.origin {
            PreviewOrigin::LocalNew { .. } => None,
            PreviewOrigin::Existing { content, .. } => Some(content),
        }
    }

    pub fn original_file_name(&self) -> Option<&str> {
        match &self.origin {
            PreviewOrigin::LocalNew { .. } => None,
            PreviewOrigin::Existing {
                original_file_name, ..
            } => Some(original_file_name),
        }
    }

    pub fn pending_action(&self) -> PreviewAction {
        match &self.origin {
            PreviewOrigin::LocalNew { .. } => PreviewAction::Create,
            PreviewOrigin::Existing { change, .. } => match change {
                PendingChange::None => PreviewAction::None,
                PendingChange::Update(_) => PreviewAction::Update,
                PendingChange::Remove => PreviewAction::Remove,
            },
        }
    }

    /// Mark an existing preview for removal.
    ///
    /// A local addition has nothing to remove remotely; drop it from the list instead.
    pub fn remove(&mut self) -> Result<(), StateError> {
        let change = self.existing_change("remove", PreviewAction::Remove)?;
        *change = PendingChange::Remove;
        Ok(())
    }

    /// Replace the content of an existing preview on the next submit.
    ///
    /// Local additions have no remote identity yet; use [`ItemPreview::retarget`].
    pub fn update_content(&mut self, content: impl Into<String>) -> Result<(), StateError> {
        let change = self.existing_change("update_content", PreviewAction::Update)?;
        *change = PendingChange::Update(content.into());
        Ok(())
    }

    /// Point a local addition at different content.
    pub fn retarget(&mut self, new_content: impl Into<String>) -> Result<(), StateError> {
        let current = self.pending_action();
        match &mut self.origin {
            PreviewOrigin::LocalNew { content } => {
                *content = new_content.into();
                Ok(())
            }
            PreviewOrigin::Existing { .. } => Err(StateError::InvalidTransition {
                from: current.to_string(),
                to: PreviewAction::Create.to_string(),
                event: "retarget".to_string(),
            }),
        }
    }

    fn existing_change(
        &mut self,
        event: &str,
        target: PreviewAction,
    ) -> Result<&mut PendingChange, StateError> {
        let current = self.pending_action();
        match &mut self.origin {
            PreviewOrigin::LocalNew { .. } => Err(StateError::InvalidTransition {
                from: current.to_string(),
                to: target.to_string(),
                event: event.to_string(),
            }),
            PreviewOrigin::Existing {
                change: PendingChange::Remove,
                ..
            } => Err(StateError::TerminalState(current.to_string())),
            PreviewOrigin::Existing { change, .. } => Ok(change),
        }
    }

    /// State after the platform accepted a submit containing this preview.
    ///
    /// Removed previews disappear. Local additions are dropped too: the
    /// platform assigns their index, which is only learned by fetching
    /// metadata again.
    pub(crate) fn into_committed(self) -> Option<ItemPreview> {
        match self.origin {
            PreviewOrigin::LocalNew { .. } => None,
            PreviewOrigin::Existing {
                change: PendingChange::Remove,
                ..
            } => None,
            PreviewOrigin::Existing {
                index,
                content,
                original_file_name,
                change,
            } => {
                let content = match change {
                    PendingChange::Update(pending) => pending,
                    _ => content,
                };
                Some(Self::existing(
                    index,
                    content,
                    original_file_name,
                    self.preview_type,
                ))
            }
        }
    }
}

impl From<PreviewDetails> for ItemPreview {
    fn from(details: PreviewDetails) -> Self {
        Self::existing(
            details.index,
            details.url_or_video_id,
            details.original_file_name,
            details.preview_type,
        )
    }
}
