use crate::driver::DriverNotification;
use crate::input::ButtonEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Capture mode, toggled by the mode key while idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CaptureMode {
    #[default]
    Photo,
    Video,
}

impl CaptureMode {
    pub fn toggled(self) -> Self {
        match self {
            CaptureMode::Photo => CaptureMode::Video,
            CaptureMode::Video => CaptureMode::Photo,
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Photo => write!(f, "photo"),
            CaptureMode::Video => write!(f, "video"),
        }
    }
}

/// Operational state of the capture state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    Capturing,
    Recording,
    /// Terminal; never left once entered
    Ending,
}

impl fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapturePhase::Idle => write!(f, "idle"),
            CapturePhase::Capturing => write!(f, "capturing"),
            CapturePhase::Recording => write!(f, "recording"),
            CapturePhase::Ending => write!(f, "ending"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Photo,
    Video,
}

/// File-set produced by one capture or recording.
///
/// For video the first path is the primary media file and the second the
/// auxiliary audio track consumed while muxing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub kind: ArtifactKind,
    pub paths: Vec<PathBuf>,
    pub session_id: Uuid,
}

impl Artifact {
    pub fn photo(session_id: Uuid, paths: Vec<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ArtifactKind::Photo,
            paths,
            session_id,
        }
    }

    pub fn video(session_id: Uuid, paths: Vec<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ArtifactKind::Video,
            paths,
            session_id,
        }
    }

    pub fn primary(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    /// Replace the paths with those reported by the driver, keeping identity.
    /// An empty report keeps the paths captured when recording stopped.
    pub fn with_reported_paths(mut self, paths: Vec<PathBuf>) -> Self {
        if !paths.is_empty() {
            self.paths = paths;
        }
        self
    }
}

/// System shutdown reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShutdownReason {
    Signal(String),
    LongPress,
    UserRequest,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal(signal) => write!(f, "signal {}", signal),
            ShutdownReason::LongPress => write!(f, "long press"),
            ShutdownReason::UserRequest => write!(f, "user request"),
        }
    }
}

/// Everything that may touch session state, delivered through one queue
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Button(ButtonEvent),
    Driver(DriverNotification),
    End(ShutdownReason),
}

pub type CommandSender = mpsc::UnboundedSender<SessionCommand>;
pub type CommandReceiver = mpsc::UnboundedReceiver<SessionCommand>;

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}
