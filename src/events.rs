use crate::error::EventBusError;
use crate::session::{ArtifactKind, CaptureMode, CapturePhase};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outbound notifications about the capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShutterlinkEvent {
    /// Capture mode flipped
    ModeChanged { mode: CaptureMode },
    /// State machine moved between phases
    PhaseChanged { from: CapturePhase, to: CapturePhase },
    /// Recording stopped; artifact awaits the metadata write
    ArtifactPending {
        artifact_id: Uuid,
        kind: ArtifactKind,
        primary: String,
    },
    /// Paths registered with the media index (relative to the media root)
    MediaIndexed { paths: Vec<String> },
    /// Metadata write failed and the partial file was removed
    MetadataWriteFailed { artifact_id: Uuid, primary: String },
    /// An upload got a response; the local file has been removed
    UploadCompleted {
        job_id: Uuid,
        path: String,
        status_code: u16,
    },
    /// An upload failed at the transport level; the local file is kept
    UploadFailed {
        job_id: Uuid,
        path: String,
        error: String,
    },
    /// Session teardown requested
    ShutdownRequested { reason: String },
}

impl ShutterlinkEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            ShutterlinkEvent::ModeChanged { mode } => format!("Mode changed to {}", mode),
            ShutterlinkEvent::PhaseChanged { from, to } => {
                format!("Phase {} -> {}", from, to)
            }
            ShutterlinkEvent::ArtifactPending { kind, primary, .. } => {
                format!("{:?} artifact pending: {}", kind, primary)
            }
            ShutterlinkEvent::MediaIndexed { paths } => {
                format!("Media indexed ({} files)", paths.len())
            }
            ShutterlinkEvent::MetadataWriteFailed { primary, .. } => {
                format!("Metadata write failed: {}", primary)
            }
            ShutterlinkEvent::UploadCompleted {
                path, status_code, ..
            } => format!("Upload of {} answered with {}", path, status_code),
            ShutterlinkEvent::UploadFailed { path, error, .. } => {
                format!("Upload of {} failed: {}", path, error)
            }
            ShutterlinkEvent::ShutdownRequested { reason } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            ShutterlinkEvent::ModeChanged { .. } => "mode_changed",
            ShutterlinkEvent::PhaseChanged { .. } => "phase_changed",
            ShutterlinkEvent::ArtifactPending { .. } => "artifact_pending",
            ShutterlinkEvent::MediaIndexed { .. } => "media_indexed",
            ShutterlinkEvent::MetadataWriteFailed { .. } => "metadata_write_failed",
            ShutterlinkEvent::UploadCompleted { .. } => "upload_completed",
            ShutterlinkEvent::UploadFailed { .. } => "upload_failed",
            ShutterlinkEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Broadcast bus for session notifications
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ShutterlinkEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<ShutterlinkEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Fails only when nobody is listening, which publishers are free to ignore.
    pub fn publish(&self, event: ShutterlinkEvent) -> Result<usize, EventBusError> {
        match &event {
            ShutterlinkEvent::UploadFailed { path, error, .. } => {
                warn!("Upload of {} failed: {}", path, error);
            }
            ShutterlinkEvent::MetadataWriteFailed { primary, .. } => {
                warn!("Metadata write failed for {}", primary);
            }
            ShutterlinkEvent::ShutdownRequested { reason } => {
                info!("Shutdown requested: {}", reason);
            }
            _ => debug!("Event: {}", event.description()),
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
