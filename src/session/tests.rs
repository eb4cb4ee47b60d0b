use super::*;
use crate::config::ShutterlinkConfig;
use crate::driver::{DriverCall, LimitReason, MockCaptureDriver};
use crate::events::{EventBus, ShutterlinkEvent};
use crate::feedback::{
    DeviceModel, FeedbackCall, FeedbackSignal, LedColor, LedTarget, RecordingFeedback, TextArea,
};
use crate::input::ButtonKey;
use crate::media::RecordingMediaIndex;
use crate::upload::{ArtifactUploader, UploadStatus};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Harness {
    controller: CaptureSessionController,
    driver: Arc<MockCaptureDriver>,
    feedback: Arc<RecordingFeedback>,
    event_bus: Arc<EventBus>,
}

fn harness(model: &str) -> Harness {
    let driver = Arc::new(MockCaptureDriver::new("/storage/emulated/0/DCIM/100RICOH"));
    let feedback = Arc::new(RecordingFeedback::new());
    let event_bus = Arc::new(EventBus::new(64));
    let signal = FeedbackSignal::new(&DeviceModel::from_name(model), feedback.clone());

    let controller = CaptureSessionController::new(
        driver.clone(),
        signal,
        feedback.clone(),
        feedback.clone(),
        Arc::clone(&event_bus),
    );

    Harness {
        controller,
        driver,
        feedback,
        event_bus,
    }
}

fn video_harness() -> Harness {
    let mut h = harness("RICOH THETA V");
    h.controller.on_button_up(ButtonKey::Mode);
    assert_eq!(h.controller.mode(), CaptureMode::Video);
    h.feedback.clear();
    h
}

#[test]
fn test_initial_state() {
    let h = harness("RICOH THETA V");
    assert_eq!(h.controller.mode(), CaptureMode::Photo);
    assert_eq!(h.controller.phase(), CapturePhase::Idle);
    assert_eq!(h.controller.pending_count(), 0);
    assert!(!h.controller.is_ended());
}

#[test]
fn test_photo_round_trip() {
    let mut h = harness("RICOH THETA V");

    h.controller.on_button_down(ButtonKey::Shutter);
    assert_eq!(h.controller.phase(), CapturePhase::Capturing);
    assert_eq!(h.driver.count(DriverCall::TakePicture), 1);

    // a second press while capturing does nothing
    h.controller.on_button_down(ButtonKey::Shutter);
    assert_eq!(h.driver.count(DriverCall::TakePicture), 1);

    h.controller.on_shutter();
    h.driver.set_capturing(false);
    let artifact = h
        .controller
        .on_picture_taken(vec![PathBuf::from("/storage/emulated/0/DCIM/R0010001.JPG")]);

    assert_eq!(h.controller.phase(), CapturePhase::Idle);
    assert_eq!(artifact.kind, ArtifactKind::Photo);
    assert_eq!(artifact.session_id, h.controller.session_id());
    assert_eq!(
        h.feedback.calls(),
        vec![
            FeedbackCall::SensorStart,
            FeedbackCall::AudioShutter,
            FeedbackCall::SensorStop,
        ]
    );
}

#[test]
fn test_refused_picture_warns_and_stays_idle() {
    let mut h = harness("RICOH THETA V");
    h.driver.refuse_picture(true);

    h.controller.on_button_down(ButtonKey::Shutter);

    assert_eq!(h.controller.phase(), CapturePhase::Idle);
    assert_eq!(
        h.feedback.calls(),
        vec![
            FeedbackCall::SensorStart,
            FeedbackCall::SensorStop,
            FeedbackCall::AudioWarning,
        ]
    );
}

#[test]
fn test_picture_cancelled_returns_to_idle() {
    let mut h = harness("RICOH THETA V");
    h.controller.on_button_down(ButtonKey::Shutter);
    h.driver.set_capturing(false);

    h.controller.on_picture_cancelled();

    assert_eq!(h.controller.phase(), CapturePhase::Idle);
    assert_eq!(h.feedback.count(&FeedbackCall::AudioWarning), 1);
}

#[test]
fn test_mode_toggle_on_release_only() {
    let mut h = harness("RICOH THETA V");
    let mut events = h.event_bus.subscribe();

    h.controller.on_button_down(ButtonKey::Mode);
    assert_eq!(h.controller.mode(), CaptureMode::Photo);

    h.controller.on_button_up(ButtonKey::Mode);
    assert_eq!(h.controller.mode(), CaptureMode::Video);
    assert_eq!(
        h.feedback.calls(),
        vec![
            FeedbackCall::HideLed(LedTarget::Led4),
            FeedbackCall::ShowLed(LedTarget::Led5),
        ]
    );

    match events.try_recv().unwrap() {
        ShutterlinkEvent::ModeChanged { mode } => assert_eq!(mode, CaptureMode::Video),
        other => panic!("unexpected event {:?}", other),
    }

    h.controller.on_button_up(ButtonKey::Mode);
    assert_eq!(h.controller.mode(), CaptureMode::Photo);
}

#[test]
fn test_mode_toggle_uses_text_display_on_z1() {
    let mut h = harness("RICOH THETA Z1");

    h.controller.on_button_up(ButtonKey::Mode);

    assert_eq!(
        h.feedback.calls(),
        vec![FeedbackCall::ShowText(TextArea::Bottom, "video".to_string())]
    );
}

#[test]
fn test_mode_toggle_ignored_when_busy() {
    let mut h = harness("RICOH THETA V");

    // capturing
    h.controller.on_button_down(ButtonKey::Shutter);
    h.controller.on_button_up(ButtonKey::Mode);
    assert_eq!(h.controller.mode(), CaptureMode::Photo);

    // driver still busy after the phase returned to idle
    h.controller.on_picture_taken(Vec::new());
    h.controller.on_button_up(ButtonKey::Mode);
    assert_eq!(h.controller.mode(), CaptureMode::Photo);

    // recorder started outside the session
    h.driver.set_capturing(false);
    h.driver.set_recorder_active(true);
    h.controller.on_button_up(ButtonKey::Mode);
    assert_eq!(h.controller.mode(), CaptureMode::Photo);

    h.driver.set_recorder_active(false);
    h.controller.on_button_up(ButtonKey::Mode);
    assert_eq!(h.controller.mode(), CaptureMode::Video);
}

#[test]
fn test_other_keys_ignored() {
    let mut h = harness("RICOH THETA V");

    h.controller.on_button_down(ButtonKey::Other(30));
    h.controller.on_button_up(ButtonKey::Other(30));
    h.controller.on_button_up(ButtonKey::Shutter);
    h.controller.on_button_long_press(ButtonKey::Shutter);

    assert_eq!(h.controller.phase(), CapturePhase::Idle);
    assert!(h.driver.calls().is_empty());
    assert!(h.feedback.calls().is_empty());
}

#[test]
fn test_start_and_stop_recording() {
    let mut h = video_harness();

    h.controller.on_button_down(ButtonKey::Shutter);
    assert_eq!(h.controller.phase(), CapturePhase::Recording);
    assert_eq!(
        h.feedback.calls(),
        vec![
            FeedbackCall::AudioMovieStart,
            FeedbackCall::BlinkLed(LedTarget::Led7, LedColor::Red, 2000),
            FeedbackCall::SensorStart,
        ]
    );

    h.feedback.clear();
    h.controller.on_button_down(ButtonKey::Shutter);

    assert_eq!(h.controller.phase(), CapturePhase::Idle);
    assert_eq!(h.controller.pending_count(), 1);
    assert_eq!(
        h.feedback.calls(),
        vec![
            FeedbackCall::AudioMovieStop,
            FeedbackCall::HideLed(LedTarget::Led7),
        ]
    );

    let artifact = h.controller.take_pending_artifact().unwrap();
    assert_eq!(artifact.kind, ArtifactKind::Video);
    assert_eq!(
        artifact.primary().unwrap(),
        PathBuf::from("/storage/emulated/0/DCIM/100RICOH/V001.MP4")
    );
    assert_eq!(artifact.paths.len(), 2);
    assert!(h.controller.take_pending_artifact().is_none());
}

#[test]
fn test_refused_start_warns_and_clears_blink() {
    let mut h = video_harness();
    h.driver.refuse_start(true);

    h.controller.on_button_down(ButtonKey::Shutter);

    assert_eq!(h.controller.phase(), CapturePhase::Idle);
    assert_eq!(
        h.feedback.calls(),
        vec![
            FeedbackCall::AudioMovieStart,
            FeedbackCall::BlinkLed(LedTarget::Led7, LedColor::Red, 2000),
            FeedbackCall::SensorStart,
            FeedbackCall::HideLed(LedTarget::Led7),
            FeedbackCall::SensorStop,
            FeedbackCall::AudioWarning,
        ]
    );
}

#[test]
fn test_start_refused_while_recorder_active() {
    let mut h = video_harness();
    h.driver.set_recorder_active(true);

    h.controller.on_button_down(ButtonKey::Shutter);

    assert_eq!(h.driver.count(DriverCall::StartRecording), 0);
    assert_eq!(h.feedback.calls(), vec![FeedbackCall::AudioWarning]);
}

#[test]
fn test_refused_stop_keeps_recording() {
    let mut h = video_harness();
    h.controller.on_button_down(ButtonKey::Shutter);
    h.driver.refuse_stop(true);
    h.feedback.clear();

    h.controller.on_button_down(ButtonKey::Shutter);

    assert_eq!(h.controller.phase(), CapturePhase::Recording);
    assert_eq!(h.controller.pending_count(), 0);
    assert_eq!(h.feedback.count(&FeedbackCall::AudioWarning), 1);
    assert_eq!(h.feedback.count(&FeedbackCall::AudioMovieStop), 0);
}

#[test]
fn test_limit_rolls_recording_over() {
    let mut h = video_harness();
    h.controller.on_button_down(ButtonKey::Shutter);

    h.controller
        .stop_or_restart_on_limit(LimitReason::MaxDuration);

    assert_eq!(h.controller.phase(), CapturePhase::Recording);
    assert_eq!(h.controller.pending_count(), 1);
    assert_eq!(
        h.driver.calls(),
        vec![
            DriverCall::StartRecording,
            DriverCall::StopRecording,
            DriverCall::StartRecording,
        ]
    );

    // the second segment gets its own files
    h.controller.on_button_down(ButtonKey::Shutter);
    let first = h.controller.take_pending_artifact().unwrap();
    let second = h.controller.take_pending_artifact().unwrap();
    assert_ne!(first.primary(), second.primary());
}

#[test]
fn test_limit_ignored_when_not_recording() {
    let mut h = video_harness();

    h.controller.stop_or_restart_on_limit(LimitReason::MaxFileSize);

    assert_eq!(h.controller.phase(), CapturePhase::Idle);
    assert!(h.driver.calls().is_empty());
}

#[test]
fn test_end_process_is_idempotent() {
    let mut h = video_harness();
    h.controller.on_button_down(ButtonKey::Shutter);

    assert!(h.controller.end_process());
    assert!(h.controller.is_ended());
    assert_eq!(h.controller.pending_count(), 1);

    assert!(!h.controller.end_process());
    assert_eq!(h.driver.count(DriverCall::Close), 1);
    assert_eq!(h.driver.count(DriverCall::StopRecording), 1);
}

#[test]
fn test_long_press_on_mode_ends_session() {
    let mut h = harness("RICOH THETA V");

    h.controller.on_button_long_press(ButtonKey::Mode);
    assert_eq!(h.controller.phase(), CapturePhase::Ending);

    // terminal: nothing reaches the driver afterwards
    h.controller.on_button_down(ButtonKey::Shutter);
    h.controller.on_button_up(ButtonKey::Mode);
    assert_eq!(h.driver.calls(), vec![DriverCall::Close]);
    assert_eq!(h.controller.phase(), CapturePhase::Ending);
}

#[test]
fn test_phase_changes_are_published() {
    let mut h = harness("RICOH THETA V");
    let mut events = h.event_bus.subscribe();

    h.controller.on_button_down(ButtonKey::Shutter);

    match events.try_recv().unwrap() {
        ShutterlinkEvent::PhaseChanged { from, to } => {
            assert_eq!(from, CapturePhase::Idle);
            assert_eq!(to, CapturePhase::Capturing);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_artifact_keeps_paths_on_empty_report() {
    let artifact = Artifact::video(
        uuid::Uuid::new_v4(),
        vec![PathBuf::from("/a/V001.MP4"), PathBuf::from("/a/V001.WAV")],
    );
    let id = artifact.id;

    let same = artifact.clone().with_reported_paths(Vec::new());
    assert_eq!(same.paths, artifact.paths);

    let replaced = artifact.with_reported_paths(vec![PathBuf::from("/b/V001.MP4")]);
    assert_eq!(replaced.id, id);
    assert_eq!(replaced.primary().unwrap(), PathBuf::from("/b/V001.MP4"));
}

#[test]
fn test_stale_duplicate_path() {
    assert_eq!(
        stale_duplicate_path(&PathBuf::from("/DCIM/100RICOH/R0010001.MP4")),
        PathBuf::from("/DCIM/100RICOH/R0010001org.MP4")
    );
    assert_eq!(
        stale_duplicate_path(&PathBuf::from("/DCIM/R0010001")),
        PathBuf::from("/DCIM/R0010001org")
    );
}

/// Endpoint that counts POSTs and answers 200
async fn counting_endpoint() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = Router::new().route(
        "/v1/upload",
        post(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1/upload", addr), hits)
}

struct MetadataHarness {
    handler: MetadataWriteHandler,
    feedback: Arc<RecordingFeedback>,
    media_index: Arc<RecordingMediaIndex>,
    event_bus: Arc<EventBus>,
}

fn metadata_harness(storage_root: &str, url: &str) -> MetadataHarness {
    let feedback = Arc::new(RecordingFeedback::new());
    let media_index = Arc::new(RecordingMediaIndex::new());
    let event_bus = Arc::new(EventBus::new(64));

    let mut config = ShutterlinkConfig::default().upload;
    config.url = url.to_string();
    config.timeout_secs = 5;
    let uploader = ArtifactUploader::new(&config, feedback.clone(), Arc::clone(&event_bus)).unwrap();

    let handler = MetadataWriteHandler::new(
        storage_root,
        uploader,
        feedback.clone(),
        media_index.clone(),
        Arc::clone(&event_bus),
    );

    MetadataHarness {
        handler,
        feedback,
        media_index,
        event_bus,
    }
}

#[tokio::test]
async fn test_metadata_success_uploads_and_indexes() {
    let (url, hits) = counting_endpoint().await;
    let root = tempfile::tempdir().unwrap();
    let capture_dir = root.path().join("DCIM/100RICOH");
    std::fs::create_dir_all(&capture_dir).unwrap();

    let media = capture_dir.join("R0010001.MP4");
    let audio = capture_dir.join("R0010001.WAV");
    let leftover = capture_dir.join("R0010001org.MP4");
    for path in [&media, &audio, &leftover] {
        std::fs::write(path, b"payload").unwrap();
    }

    let h = metadata_harness(root.path().to_str().unwrap(), &url);
    let artifact = Artifact::video(uuid::Uuid::new_v4(), vec![media.clone(), audio.clone()]);

    let job = h.handler.on_success(&artifact).await.unwrap().await.unwrap();

    assert_eq!(job.status, UploadStatus::Succeeded { status_code: 200 });
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!media.exists());
    assert!(!leftover.exists());
    assert!(audio.exists());

    assert_eq!(
        h.media_index.notifications(),
        vec![vec![
            "/DCIM/100RICOH/R0010001.MP4".to_string(),
            "/DCIM/100RICOH/R0010001.WAV".to_string(),
        ]]
    );
    assert_eq!(h.feedback.count(&FeedbackCall::SensorStop), 1);
    assert_eq!(h.feedback.count(&FeedbackCall::ErrorOccurred), 0);
}

#[tokio::test]
async fn test_metadata_failure_removes_partial_file() {
    let root = tempfile::tempdir().unwrap();
    let media = root.path().join("R0010002.MP4");
    let audio = root.path().join("R0010002.WAV");
    std::fs::write(&media, b"partial").unwrap();
    std::fs::write(&audio, b"audio").unwrap();

    let h = metadata_harness(root.path().to_str().unwrap(), "http://127.0.0.1:9/v1/upload");
    let mut events = h.event_bus.subscribe();
    let artifact = Artifact::video(uuid::Uuid::new_v4(), vec![media.clone(), audio.clone()]);

    h.handler.on_failure(&artifact).await;

    assert!(!media.exists());
    assert!(h.media_index.notifications().is_empty());
    assert_eq!(
        h.feedback.calls(),
        vec![FeedbackCall::SensorStop, FeedbackCall::ErrorOccurred]
    );
    match events.try_recv().unwrap() {
        ShutterlinkEvent::MetadataWriteFailed { artifact_id, .. } => {
            assert_eq!(artifact_id, artifact.id)
        }
        other => panic!("unexpected event {:?}", other),
    }

    // already gone: still reports the failure
    h.feedback.clear();
    h.handler.on_failure(&artifact).await;
    assert_eq!(h.feedback.count(&FeedbackCall::ErrorOccurred), 1);
}

#[tokio::test]
async fn test_register_photo_media() {
    let h = metadata_harness("/storage/emulated/0", "http://127.0.0.1:9/v1/upload");

    h.handler
        .register_media(&[PathBuf::from("/storage/emulated/0/DCIM/100RICOH/R0010003.JPG")])
        .await;
    h.handler.register_media(&[]).await;

    assert_eq!(
        h.media_index.notifications(),
        vec![vec!["/DCIM/100RICOH/R0010003.JPG".to_string()]]
    );
}

#[tokio::test]
async fn test_unattributed_failure_signals_error() {
    let h = metadata_harness("/storage/emulated/0", "http://127.0.0.1:9/v1/upload");

    h.handler.on_unattributed_failure();

    assert_eq!(
        h.feedback.calls(),
        vec![FeedbackCall::SensorStop, FeedbackCall::ErrorOccurred]
    );
}
