//! Publish Workflow Integration Tests
//!
//! Drives editors handed out by a `Workshop` against the in-memory mock
//! platform: create, update, re-fetch, failure recovery, and delete.

mod common;

use anyhow::Result;
use workshop_common::{AppId, PublishedFileId};
use workshop_platform::mock::{MockOutcome, RecordedCall, FIRST_MOCK_FILE_ID};
use workshop_platform::{ItemType, ResultCode, Visibility};
use workshop_publishing::{
    EditorError, MetadataStatus, PublishError, PublishState, ValidationError, MAX_PREVIEW_BYTES,
};

use crate::common::TestHarness;

#[test_log::test(tokio::test)]
async fn test_create_then_update_item_e2e() -> Result<()> {
    let harness = TestHarness::new()?;

    // ============================================================================
    // Step 1: Publish a brand new item
    // ============================================================================
    let editor = harness.workshop.create_item(ItemType::Community);
    editor.set_title("X");
    editor.set_description("A small castle");
    editor.set_visibility(Visibility::Public);
    editor.set_tags(["maps", "medieval"]);
    editor.set_folder(harness.content_folder("castle")?);
    editor.set_primary_preview_image(harness.file_of_size("cover.png", 2048)?);

    let state = editor.publish().await?;

    assert_eq!(state, PublishState::Done);
    assert_eq!(editor.id(), PublishedFileId(FIRST_MOCK_FILE_ID));
    assert!(editor.error().is_none());
    assert!(!editor.is_publishing());

    let calls = harness.platform.recorded_calls();
    assert!(matches!(
        calls.first(),
        Some(RecordedCall::CreateItem {
            app_id: AppId(480),
            item_type: ItemType::Community
        })
    ));
    assert!(matches!(
        calls.last(),
        Some(RecordedCall::SubmitItemUpdate { change_note, .. })
            if change_note == "Published from integration tests"
    ));
    let staged: Vec<_> = harness
        .platform
        .staging_calls()
        .into_iter()
        .map(|call| format!("{call:?}"))
        .collect();
    assert_eq!(staged.len(), 6);
    assert!(staged[0].starts_with("SetTitle"));
    assert!(staged[1].starts_with("SetDescription"));
    assert!(staged[2].starts_with("SetTags"));
    assert!(staged[3].starts_with("SetVisibility"));
    assert!(staged[4].starts_with("SetContent"));
    assert!(staged[5].starts_with("SetPreview"));

    // ============================================================================
    // Step 2: Open the item again and load what was published
    // ============================================================================
    let reopened = harness.workshop.edit_item(editor.id());
    assert!(!reopened.is_metadata_populated());

    assert_eq!(reopened.fetch_metadata().await?, MetadataStatus::Populated);
    assert!(reopened.is_metadata_populated());
    assert_eq!(reopened.title().as_deref(), Some("X"));
    assert_eq!(reopened.description().as_deref(), Some("A small castle"));
    assert_eq!(reopened.tags(), vec!["maps", "medieval"]);

    // ============================================================================
    // Step 3: Update the existing item without creating a new one
    // ============================================================================
    harness.platform.reset_history();
    reopened.set_title("Castle pack");
    reopened.set_change_note("Renamed");

    assert_eq!(reopened.publish().await?, PublishState::Done);
    let calls = harness.platform.recorded_calls();
    assert!(!calls
        .iter()
        .any(|call| matches!(call, RecordedCall::CreateItem { .. })));
    assert_eq!(
        harness
            .platform
            .item(editor.id())
            .map(|item| item.title),
        Some("Castle pack".to_string())
    );

    Ok(())
}

#[tokio::test]
async fn test_missing_item_leaves_local_fields() -> Result<()> {
    let harness = TestHarness::new()?;
    let editor = harness.workshop.edit_item(PublishedFileId(42));
    editor.set_title("Unsaved title");

    let status = editor.fetch_metadata().await?;

    assert_eq!(status, MetadataStatus::Missing);
    assert!(editor.is_metadata_populated());
    assert_eq!(editor.title().as_deref(), Some("Unsaved title"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_validation_failure_then_recovery() -> Result<()> {
    let harness = TestHarness::new()?;
    let editor = harness.workshop.create_item(ItemType::Community);
    editor.set_title("X");
    editor.set_primary_preview_image(harness.file_of_size("cover.png", MAX_PREVIEW_BYTES)?);

    // ============================================================================
    // Step 1: Oversized cover image fails after creation, before staging
    // ============================================================================
    assert_eq!(editor.publish().await?, PublishState::Failed);
    assert!(!editor.is_publishing());
    assert!(!editor.id().is_unset());
    assert!(matches!(
        editor.failure(),
        Some(PublishError::Validation(
            ValidationError::PreviewImageTooLarge { .. }
        ))
    ));
    assert!(harness.platform.staging_calls().is_empty());

    // ============================================================================
    // Step 2: Shrink the image and publish again against the same item
    // ============================================================================
    let created = editor.id();
    editor.set_primary_preview_image(harness.file_of_size("cover.png", MAX_PREVIEW_BYTES - 1)?);

    assert_eq!(editor.publish().await?, PublishState::Done);
    assert_eq!(editor.id(), created);
    assert!(editor.error().is_none());

    let creates = harness
        .platform
        .recorded_calls()
        .into_iter()
        .filter(|call| matches!(call, RecordedCall::CreateItem { .. }))
        .count();
    assert_eq!(creates, 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_folder_fails_publish() -> Result<()> {
    let harness = TestHarness::new()?;
    let editor = harness.workshop.create_item(ItemType::Community);
    editor.set_folder(harness.dir.path().join("nowhere"));

    assert_eq!(editor.publish().await?, PublishState::Failed);
    assert!(!editor.is_publishing());
    let message = editor.error().unwrap_or_default();
    assert!(message.contains("Content folder does not exist"), "{message}");
    Ok(())
}

#[tokio::test]
async fn test_submit_failure_reports_legal_agreement() -> Result<()> {
    let harness = TestHarness::new()?;
    harness
        .platform
        .behavior()
        .set_submit_outcome(MockOutcome::Fail(ResultCode::InsufficientPrivilege));
    harness.platform.behavior().set_needs_legal_agreement(true);

    let editor = harness.workshop.edit_item(PublishedFileId(42));
    editor.set_title("X");

    assert_eq!(editor.publish().await?, PublishState::Failed);
    assert!(editor.needs_legal_agreement());
    assert_eq!(
        editor.error().as_deref(),
        Some("Error publishing changes: InsufficientPrivilege (needs legal agreement: true)")
    );
    Ok(())
}

#[tokio::test]
async fn test_transport_failure_is_recoverable() -> Result<()> {
    let harness = TestHarness::new()?;
    harness
        .platform
        .behavior()
        .set_create_outcome(MockOutcome::Transport);
    let editor = harness.workshop.create_item(ItemType::Art);

    assert_eq!(editor.publish().await?, PublishState::Failed);
    assert!(editor.id().is_unset());
    assert_eq!(
        editor.failure().map(|err| err.error_code()),
        Some("TRANSPORT_FAILURE")
    );

    harness.platform.behavior().reset();
    assert_eq!(editor.publish().await?, PublishState::Done);
    assert!(!editor.id().is_unset());
    Ok(())
}

#[tokio::test]
async fn test_delete_published_item() -> Result<()> {
    let harness = TestHarness::new()?;
    let editor = harness.workshop.create_item(ItemType::Community);
    editor.set_title("Short lived");
    editor.publish().await?;
    let id = editor.id();
    assert!(harness.platform.item(id).is_some());

    editor.delete().await?;

    assert!(editor.id().is_unset());
    assert!(harness.platform.item(id).is_none());

    let reopened = harness.workshop.edit_item(id);
    assert_eq!(reopened.fetch_metadata().await?, MetadataStatus::Missing);

    // Deleting again is a no-op
    editor.delete().await?;
    let deletes = harness
        .platform
        .recorded_calls()
        .into_iter()
        .filter(|call| matches!(call, RecordedCall::DeleteItem(_)))
        .count();
    assert_eq!(deletes, 1);
    Ok(())
}

#[tokio::test]
async fn test_rejected_delete_keeps_item() -> Result<()> {
    let harness = TestHarness::new()?;
    harness
        .platform
        .behavior()
        .set_delete_outcome(MockOutcome::Fail(ResultCode::AccessDenied));
    let editor = harness.workshop.edit_item(PublishedFileId(42));

    let result = editor.delete().await;

    assert!(matches!(result, Err(EditorError::DeleteFailed { .. })));
    assert_eq!(editor.id(), PublishedFileId(42));
    Ok(())
}

#[tokio::test]
async fn test_progress_visible_from_other_handle() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.platform.behavior().set_progress(512, 2048);
    harness.platform.behavior().submit_gate.close();

    let editor = harness.workshop.edit_item(PublishedFileId(42));
    editor.set_folder(harness.content_folder("content")?);

    let publishing = tokio::spawn({
        let editor = editor.clone();
        async move { editor.publish().await }
    });

    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while editor.state() != PublishState::Submitting {
            tokio::task::yield_now().await;
        }
    })
    .await?;

    assert!(editor.is_publishing());
    assert_eq!(editor.progress(), 0.25);
    assert_eq!(editor.bytes_uploaded(), 512);
    assert_eq!(editor.bytes_total(), 2048);
    assert!(matches!(
        editor.publish().await,
        Err(EditorError::AlreadyPublishing(_))
    ));

    harness.platform.behavior().submit_gate.open();
    assert_eq!(publishing.await??, PublishState::Done);
    assert_eq!(editor.progress(), 1.0);
    Ok(())
}
