//! Preview Workflow Integration Tests
//!
//! Preview additions, replacements and removals staged through an editor,
//! applied by the mock platform, and observed again through a fresh fetch.

mod common;

use anyhow::Result;
use workshop_platform::mock::RecordedCall;
use workshop_platform::{ItemType, PreviewType};
use workshop_publishing::{
    EditorError, ItemPreview, PreviewAction, PublishError, PublishState, ValidationError,
    MAX_PREVIEW_BYTES,
};

use crate::common::TestHarness;

#[test_log::test(tokio::test)]
async fn test_preview_lifecycle_e2e() -> Result<()> {
    let harness = TestHarness::new()?;

    // ============================================================================
    // Step 1: Publish an item with one image and one video preview
    // ============================================================================
    let editor = harness.workshop.create_item(ItemType::Community);
    editor.set_title("Gallery");
    let shot = harness.file_of_size("shot.png", 4096)?;
    editor.add_preview(shot.display().to_string(), PreviewType::Image);
    editor.add_preview("dQw4w9WgXcQ", PreviewType::YouTubeVideo);

    assert_eq!(editor.publish().await?, PublishState::Done);
    // Local additions only get an index from the platform; they are dropped until re-fetched
    assert!(editor.previews().is_empty());

    // ============================================================================
    // Step 2: Re-fetch and see both previews with platform indexes
    // ============================================================================
    let reopened = harness.workshop.edit_item(editor.id());
    reopened.fetch_metadata().await?;

    let previews = reopened.previews();
    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0].index(), Some(0));
    assert_eq!(previews[0].original_file_name(), Some("shot.png"));
    assert_eq!(previews[1].index(), Some(1));
    assert_eq!(previews[1].preview_type(), PreviewType::YouTubeVideo);
    assert!(previews
        .iter()
        .all(|preview| preview.pending_action() == PreviewAction::None));

    // ============================================================================
    // Step 3: Replace the video and remove the image
    // ============================================================================
    harness.platform.reset_history();
    reopened.update_preview(1, "oHg5SJYRHA0")?;
    reopened.remove_preview(0)?;
    assert!(reopened.remove_preview(0).is_err());

    assert_eq!(reopened.publish().await?, PublishState::Done);
    let preview_calls: Vec<RecordedCall> = harness
        .platform
        .staging_calls()
        .into_iter()
        .filter(|call| {
            matches!(
                call,
                RecordedCall::RemovePreview(_) | RecordedCall::UpdatePreviewVideo { .. }
            )
        })
        .collect();
    assert_eq!(
        preview_calls,
        vec![
            RecordedCall::RemovePreview(0),
            RecordedCall::UpdatePreviewVideo {
                index: 1,
                video_id: "oHg5SJYRHA0".to_string()
            },
        ]
    );

    let remaining = reopened.previews();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].published_content(), Some("oHg5SJYRHA0"));
    assert_eq!(remaining[0].pending_action(), PreviewAction::None);

    // ============================================================================
    // Step 4: The platform agrees
    // ============================================================================
    let check = harness.workshop.edit_item(editor.id());
    check.fetch_metadata().await?;
    let stored = check.previews();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content_reference(), "oHg5SJYRHA0");
    Ok(())
}

#[tokio::test]
async fn test_invalid_preview_stages_nothing() -> Result<()> {
    let harness = TestHarness::new()?;
    let editor = harness.workshop.create_item(ItemType::Community);
    editor.set_title("Gallery");
    editor.add_preview(
        harness.file_of_size("ok.png", 10)?.display().to_string(),
        PreviewType::Image,
    );
    editor.add_preview(
        harness
            .file_of_size("huge.png", MAX_PREVIEW_BYTES)?
            .display()
            .to_string(),
        PreviewType::Image,
    );

    assert_eq!(editor.publish().await?, PublishState::Failed);
    assert!(matches!(
        editor.failure(),
        Some(PublishError::Validation(
            ValidationError::PreviewFileTooLarge { .. }
        ))
    ));
    assert!(harness.platform.staging_calls().is_empty());
    assert_eq!(editor.previews().len(), 2);

    // Drop the oversized one and try again
    let discarded = editor.discard_preview(1)?;
    assert!(discarded.content_reference().ends_with("huge.png"));
    assert_eq!(editor.publish().await?, PublishState::Done);
    assert_eq!(harness.platform.staging_calls().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_preview_edits_on_local_additions() -> Result<()> {
    let harness = TestHarness::new()?;
    let editor = harness.workshop.create_item(ItemType::Community);
    editor.add_preview("first.png", PreviewType::Image);

    assert!(matches!(
        editor.update_preview(0, "second.png"),
        Err(EditorError::State(_))
    ));
    assert!(matches!(
        editor.remove_preview(0),
        Err(EditorError::State(_))
    ));

    editor.edit_draft(|draft| draft.previews[0].retarget("second.png"))?;
    assert_eq!(editor.previews()[0].content_reference(), "second.png");

    editor.set_previews(vec![ItemPreview::existing(
        5,
        "https://cdn.example.com/5.png",
        "five.png",
        PreviewType::Image,
    )]);
    assert_eq!(editor.previews()[0].index(), Some(5));
    assert!(matches!(
        editor.update_preview(3, "x.png"),
        Err(EditorError::PreviewIndex(3))
    ));
    Ok(())
}
