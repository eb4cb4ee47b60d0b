use super::types::{CaptureDriver, DriverCallbacks, LimitReason};
use crate::config::RecordingConfig;
use crate::error::{DriverError, Result};
use crate::session::stale_duplicate_path;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Directory the simulated camera writes into, under the storage root
pub const CAPTURE_SUBDIR: &str = "DCIM/100RICOH";

/// Placeholder payload written to every simulated file
const PLACEHOLDER: &[u8] = b"shutterlink-simulated-capture";

#[derive(Debug, Clone)]
pub struct SimulatedDriverSettings {
    pub picture_delay: Duration,
    pub metadata_delay: Duration,
    pub max_duration: Duration,
}

impl From<&RecordingConfig> for SimulatedDriverSettings {
    fn from(config: &RecordingConfig) -> Self {
        Self {
            picture_delay: Duration::from_millis(config.picture_delay_ms),
            metadata_delay: Duration::from_millis(config.metadata_delay_ms),
            max_duration: Duration::from_secs(config.max_duration_secs),
        }
    }
}

struct ActiveRecording {
    media: PathBuf,
    audio: PathBuf,
    limit_token: CancellationToken,
}

#[derive(Default)]
struct DriverState {
    recording: Option<ActiveRecording>,
    capturing: bool,
    closed: bool,
    sequence: u32,
}

/// File-backed stand-in for the camera driver.
///
/// Writes placeholder JPEG/MP4/WAV files and raises the same callbacks, with the
/// same leftovers, as the hardware driver. Must be used inside a tokio runtime.
pub struct SimulatedDriver {
    capture_dir: PathBuf,
    settings: SimulatedDriverSettings,
    callbacks: DriverCallbacks,
    state: Arc<Mutex<DriverState>>,
}

impl SimulatedDriver {
    pub fn new(
        storage_root: impl AsRef<Path>,
        settings: SimulatedDriverSettings,
        callbacks: DriverCallbacks,
    ) -> Result<Self> {
        let capture_dir = storage_root.as_ref().join(CAPTURE_SUBDIR);
        std::fs::create_dir_all(&capture_dir).map_err(|e| DriverError::FileWrite {
            path: capture_dir.display().to_string(),
            source: e,
        })?;

        info!(
            "Simulated capture driver writing to {}",
            capture_dir.display()
        );

        Ok(Self {
            capture_dir,
            settings,
            callbacks,
            state: Arc::new(Mutex::new(DriverState::default())),
        })
    }

    pub fn capture_dir(&self) -> &Path {
        &self.capture_dir
    }

    fn next_path(&self, state: &mut DriverState, extension: &str) -> PathBuf {
        state.sequence += 1;
        self.capture_dir
            .join(format!("R{:07}.{}", state.sequence, extension))
    }
}

impl CaptureDriver for SimulatedDriver {
    fn take_picture(&self) -> std::result::Result<(), DriverError> {
        let path = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(DriverError::Closed);
            }
            if state.capturing {
                return Err(DriverError::Busy);
            }
            state.capturing = true;
            self.next_path(&mut state, "JPG")
        };

        debug!("Simulated still capture into {}", path.display());

        let callbacks = self.callbacks.clone();
        let state = Arc::clone(&self.state);
        let delay = self.settings.picture_delay;

        tokio::spawn(async move {
            sleep(delay / 2).await;
            callbacks.shutter();
            sleep(delay / 2).await;

            let written = tokio::fs::write(&path, PLACEHOLDER).await;
            state.lock().capturing = false;

            match written {
                Ok(()) => callbacks.picture_taken(vec![path]),
                Err(e) => {
                    error!("Failed to write still {}: {}", path.display(), e);
                    callbacks.picture_cancelled();
                }
            }
        });

        Ok(())
    }

    fn start_recording(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed || state.recording.is_some() {
            return false;
        }

        let media = self.next_path(&mut state, "MP4");
        let audio = media.with_extension("WAV");

        for path in [&media, &audio] {
            if let Err(e) = std::fs::write(path, PLACEHOLDER) {
                warn!("Failed to create {}: {}", path.display(), e);
                return false;
            }
        }

        let limit_token = CancellationToken::new();
        let token = limit_token.clone();
        let callbacks = self.callbacks.clone();
        let max_duration = self.settings.max_duration;

        tokio::spawn(async move {
            tokio::select! {
                _ = sleep(max_duration) => callbacks.limit_reached(LimitReason::MaxDuration),
                _ = token.cancelled() => {}
            }
        });

        info!("Simulated recording started: {}", media.display());
        state.recording = Some(ActiveRecording {
            media,
            audio,
            limit_token,
        });
        true
    }

    fn stop_recording(&self) -> bool {
        let recording = match self.state.lock().recording.take() {
            Some(recording) => recording,
            None => return false,
        };
        recording.limit_token.cancel();

        info!("Simulated recording stopped: {}", recording.media.display());

        let callbacks = self.callbacks.clone();
        let delay = self.settings.metadata_delay;

        tokio::spawn(async move {
            sleep(delay).await;

            let leftover = stale_duplicate_path(&recording.media);
            let written = async {
                tokio::fs::copy(&recording.media, &leftover).await?;
                let mut contents = tokio::fs::read(&recording.media).await?;
                contents.extend_from_slice(b"+meta");
                tokio::fs::write(&recording.media, contents).await
            }
            .await;

            match written {
                Ok(()) => callbacks.metadata_written(vec![recording.media, recording.audio]),
                Err(e) => {
                    error!(
                        "Simulated metadata write failed for {}: {}",
                        recording.media.display(),
                        e
                    );
                    callbacks.metadata_write_failed();
                }
            }
        });

        true
    }

    fn is_recorder_active(&self) -> bool {
        self.state.lock().recording.is_some()
    }

    fn is_capturing(&self) -> bool {
        self.state.lock().capturing
    }

    fn recorded_files(&self) -> Vec<PathBuf> {
        self.state
            .lock()
            .recording
            .as_ref()
            .map(|r| vec![r.media.clone(), r.audio.clone()])
            .unwrap_or_default()
    }

    fn close(&self) {
        let mut state = self.state.lock();
        if let Some(recording) = state.recording.take() {
            recording.limit_token.cancel();
        }
        state.closed = true;
        info!("Simulated capture driver closed");
    }
}
