//! Dashboard session state tests: drag and drop, upload notices, selection

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use avp_common::events::UploadState;
use avp_common::ImageRecord;
use avp_dash::services::{FileSource, InMemoryFile, LocalFile, UploadAttempt, SUCCESS_SUMMARY};
use avp_dash::session::DragState;
use helpers::{dashboard_for, png_bytes, MockBackend};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_drag_enter_and_leave() {
    let backend = MockBackend::start().await;
    let mut session = dashboard_for(&backend, 50).session();

    assert_eq!(session.drag_state(), DragState::Inactive);
    session.drag_enter();
    session.drag_over();
    assert_eq!(session.drag_state(), DragState::Active);
    session.drag_leave();
    assert_eq!(session.drag_state(), DragState::Inactive);
}

#[tokio::test]
async fn test_drop_uploads_first_file_only() {
    let backend = MockBackend::start().await;
    let mut session = dashboard_for(&backend, 50).session();

    session.drag_enter();
    let files: Vec<Box<dyn FileSource>> = vec![
        Box::new(InMemoryFile::new("first.png", "image/png", png_bytes())),
        Box::new(InMemoryFile::new("second.png", "image/png", png_bytes())),
    ];
    let attempt = session.drop_files(&files).await;

    assert!(attempt.is_success());
    assert_eq!(session.drag_state(), DragState::Inactive);
    assert_eq!(backend.upload_hits(), 1);
    assert_eq!(backend.last_upload().unwrap()["filename"], "first.png");

    let notice = session.last_notice().unwrap();
    assert!(notice.success);
    assert_eq!(notice.message, SUCCESS_SUMMARY);
}

#[tokio::test]
async fn test_empty_drop_resets_drag() {
    let backend = MockBackend::start().await;
    let mut session = dashboard_for(&backend, 50).session();

    session.drag_enter();
    let attempt = session.drop_files(&[]).await;
    assert!(matches!(attempt, UploadAttempt::Ignored));
    assert_eq!(session.drag_state(), DragState::Inactive);
}

#[tokio::test]
async fn test_drop_while_uploading_is_ignored() {
    let backend = MockBackend::start().await;
    backend.set_upload_delay(Duration::from_millis(300));
    let dashboard = dashboard_for(&backend, 50);
    let mut session = dashboard.session();

    let workflow = Arc::clone(&dashboard.workflow);
    let in_flight = tokio::spawn(async move {
        let file = InMemoryFile::new("busy.png", "image/png", png_bytes());
        workflow.upload(&file).await
    });
    dashboard
        .workflow
        .subscribe_state()
        .wait_for(|s| *s == UploadState::Submitting)
        .await
        .unwrap();

    session.drag_enter();
    let files: Vec<Box<dyn FileSource>> =
        vec![Box::new(InMemoryFile::new("late.png", "image/png", png_bytes()))];
    let attempt = session.drop_files(&files).await;

    assert!(matches!(attempt, UploadAttempt::Ignored));
    // Drag state untouched by an ignored drop
    assert_eq!(session.drag_state(), DragState::Active);
    assert!(session.last_notice().is_none());

    assert!(in_flight.await.unwrap().is_success());
    assert_eq!(backend.upload_hits(), 1);
}

#[tokio::test]
async fn test_notice_replaced_by_next_upload() {
    let backend = MockBackend::start().await;
    let mut session = dashboard_for(&backend, 50).session();

    session
        .upload(&InMemoryFile::new("clip.gif", "image/gif", vec![1, 2, 3]))
        .await;
    let notice = session.last_notice().unwrap();
    assert!(!notice.success);
    assert_eq!(notice.message, "Please upload a valid image file (JPG, PNG, WebP)");

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("photo.png");
    std::fs::write(&path, png_bytes()).unwrap();
    let file = LocalFile::open(&path).await.unwrap();

    session.upload(&file).await;
    assert!(session.last_notice().unwrap().success);

    session.dismiss_notice();
    assert!(session.last_notice().is_none());
}

#[tokio::test]
async fn test_selection_open_and_close() {
    let backend = MockBackend::start().await;
    let mut session = dashboard_for(&backend, 50).session();

    let record: ImageRecord = serde_json::from_value(json!({
        "image_id": "i-9",
        "processing_status": "Completed",
        "image_url": "https://img/full.jpg",
        "thumbnail_url": "https://img/thumb.jpg"
    }))
    .unwrap();

    session.open(&record, 2);
    let card = session.selection().unwrap();
    assert_eq!(card.display_name, "Image 3");
    assert_eq!(card.id.as_deref(), Some("i-9"));
    assert_eq!(card.status_label, "completed");
    assert_eq!(card.detail_image_url.as_deref(), Some("https://img/full.jpg"));

    session.close();
    assert!(session.selection().is_none());
}
