//! Local validation of publish inputs
//!
//! The platform only accepts preview files strictly smaller than 1 MiB, and
//! content folders must exist before they can be uploaded.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Largest accepted preview file size is one byte below this
pub const MAX_PREVIEW_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Content folder does not exist: {}", .0.display())]
    FolderMissing(PathBuf),

    #[error("Content path is not a folder: {}", .0.display())]
    NotAFolder(PathBuf),

    #[error("Primary preview image does not exist: {}", .0.display())]
    PreviewImageMissing(PathBuf),

    #[error("Primary preview image must be under 1 MiB, got {size} bytes: {}", .path.display())]
    PreviewImageTooLarge { path: PathBuf, size: u64 },

    #[error("Preview file does not exist: {}", .0.display())]
    PreviewFileMissing(PathBuf),

    #[error("Preview file must be under 1 MiB, got {size} bytes: {}", .path.display())]
    PreviewFileTooLarge { path: PathBuf, size: u64 },

    #[error("Preview video reference cannot be empty")]
    EmptyVideoReference,
}

/// Check that the content folder exists and is a directory
pub fn validate_content_folder(folder: &Path) -> Result<(), ValidationError> {
    match fs::metadata(folder) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ValidationError::NotAFolder(folder.to_path_buf())),
        Err(_) => Err(ValidationError::FolderMissing(folder.to_path_buf())),
    }
}

/// Check the primary preview image, returning its size
pub fn validate_primary_preview(file: &Path) -> Result<u64, ValidationError> {
    let size = file_size(file)
        .ok_or_else(|| ValidationError::PreviewImageMissing(file.to_path_buf()))?;
    if size >= MAX_PREVIEW_BYTES {
        return Err(ValidationError::PreviewImageTooLarge {
            path: file.to_path_buf(),
            size,
        });
    }
    Ok(size)
}

/// Check an additional preview file, returning its size
pub fn validate_preview_file(file: &Path) -> Result<u64, ValidationError> {
    let size =
        file_size(file).ok_or_else(|| ValidationError::PreviewFileMissing(file.to_path_buf()))?;
    if size >= MAX_PREVIEW_BYTES {
        return Err(ValidationError::PreviewFileTooLarge {
            path: file.to_path_buf(),
            size,
        });
    }
    Ok(size)
}

/// Check a hosted video reference
pub fn validate_video_reference(reference: &str) -> Result<(), ValidationError> {
    if reference.trim().is_empty() {
        return Err(ValidationError::EmptyVideoReference);
    }
    Ok(())
}

fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
}
