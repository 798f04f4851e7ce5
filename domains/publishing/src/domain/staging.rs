//! Staging plan for an item update
//!
//! Every field is validated while the plan is built, before any call is
//! queued on the update handle.

use std::path::{Path, PathBuf};

use workshop_platform::{ContentPlatform, PlatformError, PreviewType, UpdateHandle, Visibility};

use crate::domain::draft::ItemDraft;
use crate::domain::preview::{ItemPreview, PendingChange, PreviewOrigin};
use crate::domain::validation::{
    validate_content_folder, validate_preview_file, validate_primary_preview,
    validate_video_reference, ValidationError,
};
use crate::error::PublishError;

/// One synchronous staging call against an open update handle
#[derive(Debug, Clone, PartialEq)]
pub enum StagingStep {
    Title(String),
    Description(String),
    Tags(Vec<String>),
    Visibility(Visibility),
    Content(PathBuf),
    PreviewImage(PathBuf),
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
}

impl StagingStep {
    /// Name of the platform operation this step calls
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title(_) => "set_item_title",
            Self::Description(_) => "set_item_description",
            Self::Tags(_) => "set_item_tags",
            Self::Visibility(_) => "set_item_visibility",
            Self::Content(_) => "set_item_content",
            Self::PreviewImage(_) => "set_item_preview",
            Self::AddPreviewFile { .. } => "add_item_preview_file",
            Self::AddPreviewVideo(_) => "add_item_preview_video",
            Self::UpdatePreviewFile { .. } => "update_item_preview_file",
            Self::UpdatePreviewVideo { .. } => "update_item_preview_video",
            Self::RemovePreview(_) => "remove_item_preview",
        }
    }

    fn apply(
        &self,
        platform: &dyn ContentPlatform,
        handle: UpdateHandle,
    ) -> Result<(), PlatformError> {
        match self {
            Self::Title(title) => platform.set_item_title(handle, title),
            Self::Description(description) => platform.set_item_description(handle, description),
            Self::Tags(tags) => platform.set_item_tags(handle, tags),
            Self::Visibility(visibility) => platform.set_item_visibility(handle, *visibility),
            Self::Content(folder) => platform.set_item_content(handle, folder),
            Self::PreviewImage(file) => platform.set_item_preview(handle, file),
            Self::AddPreviewFile { file, preview_type } => {
                platform.add_item_preview_file(handle, file, *preview_type)
            }
            Self::AddPreviewVideo(video_id) => platform.add_item_preview_video(handle, video_id),
            Self::UpdatePreviewFile { index, file } => {
                platform.update_item_preview_file(handle, *index, file)
            }
            Self::UpdatePreviewVideo { index, video_id } => {
                platform.update_item_preview_video(handle, *index, video_id)
            }
            Self::RemovePreview(index) => platform.remove_item_preview(handle, *index),
        }
    }
}

/// Validated, ordered list of staging calls for one publish attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagingPlan {
    steps: Vec<StagingStep>,
}

impl StagingPlan {
    /// Validate the draft and order its changes.
    ///
    /// Order: title, description, tags, visibility, content folder, primary
    /// preview, then previews in list order.
    pub fn build(draft: &ItemDraft) -> Result<Self, ValidationError> {
        let mut steps = Vec::new();

        if let Some(title) = &draft.title {
            steps.push(StagingStep::Title(title.clone()));
        }
        if let Some(description) = &draft.description {
            steps.push(StagingStep::Description(description.clone()));
        }
        if !draft.tags.is_empty() {
            steps.push(StagingStep::Tags(draft.tags.iter().cloned().collect()));
        }
        if let Some(visibility) = draft.visibility {
            steps.push(StagingStep::Visibility(visibility));
        }
        if let Some(folder) = &draft.folder {
            validate_content_folder(folder)?;
            steps.push(StagingStep::Content(folder.clone()));
        }
        if let Some(image) = &draft.primary_preview_image {
            validate_primary_preview(image)?;
            steps.push(StagingStep::PreviewImage(image.clone()));
        }
        for preview in &draft.previews {
            if let Some(step) = preview_step(preview)? {
                steps.push(step);
            }
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[StagingStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Queue every step on `handle`, stopping at the first rejected call.
    pub fn stage(
        &self,
        platform: &dyn ContentPlatform,
        handle: UpdateHandle,
    ) -> Result<(), PublishError> {
        for step in &self.steps {
            tracing::debug!(%handle, step = step.name(), "Staging change");
            step.apply(platform, handle)
                .map_err(|source| PublishError::Staging {
                    step: step.name(),
                    source,
                })?;
        }
        Ok(())
    }
}

fn preview_step(preview: &ItemPreview) -> Result<Option<StagingStep>, ValidationError> {
    let preview_type = preview.preview_type();
    let step = match preview.origin() {
        PreviewOrigin::LocalNew { content } if preview_type.is_video() => {
            validate_video_reference(content)?;
            StagingStep::AddPreviewVideo(content.clone())
        }
        PreviewOrigin::LocalNew { content } => {
            let file = Path::new(content);
            validate_preview_file(file)?;
            StagingStep::AddPreviewFile {
                file: file.to_path_buf(),
                preview_type,
            }
        }
        PreviewOrigin::Existing {
            index,
            change: PendingChange::Update(content),
            ..
        } => {
            if preview_type.is_video() {
                validate_video_reference(content)?;
                StagingStep::UpdatePreviewVideo {
                    index: *index,
                    video_id: content.clone(),
                }
            } else {
                let file = Path::new(content);
                validate_preview_file(file)?;
                StagingStep::UpdatePreviewFile {
                    index: *index,
                    file: file.to_path_buf(),
                }
            }
        }
        PreviewOrigin::Existing {
            index,
            change: PendingChange::Remove,
            ..
        } => StagingStep::RemovePreview(*index),
        PreviewOrigin::Existing {
            change: PendingChange::None,
            ..
        } => return Ok(None),
    };
    Ok(Some(step))
}
