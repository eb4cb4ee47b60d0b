use crate::error::DriverError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Why the driver cut a recording short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitReason {
    MaxDuration,
    MaxFileSize,
}

impl fmt::Display for LimitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitReason::MaxDuration => write!(f, "max duration"),
            LimitReason::MaxFileSize => write!(f, "max file size"),
        }
    }
}

/// Asynchronous callbacks raised by the capture driver, possibly from its own worker thread
#[derive(Debug, Clone, PartialEq)]
pub enum DriverNotification {
    /// Shutter released for a still capture
    Shutter,
    /// Still capture written; full paths
    PictureTaken { paths: Vec<PathBuf> },
    /// Still capture abandoned by the driver
    PictureCancelled,
    /// Recording hit a hard limit
    LimitReached { reason: LimitReason },
    /// Muxing and metadata write finished; full paths of media and audio files
    MetadataWritten { paths: Vec<PathBuf> },
    /// Muxing or metadata write failed
    MetadataWriteFailed,
}

/// Handle the driver uses to deliver its callbacks
#[derive(Clone)]
pub struct DriverCallbacks {
    deliver: Arc<dyn Fn(DriverNotification) + Send + Sync>,
}

impl DriverCallbacks {
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(DriverNotification) + Send + Sync + 'static,
    {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    pub fn notify(&self, notification: DriverNotification) {
        (self.deliver)(notification)
    }

    pub fn shutter(&self) {
        self.notify(DriverNotification::Shutter)
    }

    pub fn picture_taken(&self, paths: Vec<PathBuf>) {
        self.notify(DriverNotification::PictureTaken { paths })
    }

    pub fn picture_cancelled(&self) {
        self.notify(DriverNotification::PictureCancelled)
    }

    pub fn limit_reached(&self, reason: LimitReason) {
        self.notify(DriverNotification::LimitReached { reason })
    }

    pub fn metadata_written(&self, paths: Vec<PathBuf>) {
        self.notify(DriverNotification::MetadataWritten { paths })
    }

    pub fn metadata_write_failed(&self) {
        self.notify(DriverNotification::MetadataWriteFailed)
    }
}

impl fmt::Debug for DriverCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverCallbacks").finish_non_exhaustive()
    }
}

/// Capture and encoding driver.
///
/// Calls return immediately; outcomes arrive later through [`DriverCallbacks`].
pub trait CaptureDriver: Send + Sync {
    /// Begin a still capture; completion arrives as `PictureTaken` or `PictureCancelled`
    fn take_picture(&self) -> Result<(), DriverError>;

    /// Start a recording; `false` when the driver refuses
    fn start_recording(&self) -> bool;

    /// Stop the active recording; `false` when nothing was stopped
    fn stop_recording(&self) -> bool;

    fn is_recorder_active(&self) -> bool;

    fn is_capturing(&self) -> bool;

    /// Files of the active recording, primary media first
    fn recorded_files(&self) -> Vec<PathBuf>;

    /// Release the device; further capture calls fail
    fn close(&self);
}
