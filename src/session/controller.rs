use super::types::{Artifact, CaptureMode, CapturePhase};
use crate::driver::{CaptureDriver, LimitReason};
use crate::events::{EventBus, ShutterlinkEvent};
use crate::feedback::{FeedbackSignal, IndicatorSink, LedColor, LedTarget, Notifier};
use crate::input::{ButtonAction, ButtonEvent, ButtonKey};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Blink period of the recording lamp
const RECORDING_BLINK_MS: u32 = 2000;

/// Capture state machine.
///
/// Not internally synchronized: the owner serializes every call, normally by
/// draining a single command queue.
pub struct CaptureSessionController {
    session_id: Uuid,
    mode: CaptureMode,
    phase: CapturePhase,
    driver: Arc<dyn CaptureDriver>,
    feedback: FeedbackSignal,
    indicator: Arc<dyn IndicatorSink>,
    notifier: Arc<dyn Notifier>,
    event_bus: Arc<EventBus>,
    /// Stopped recordings awaiting their metadata-write callback, oldest first
    pending: VecDeque<Artifact>,
}

impl CaptureSessionController {
    pub fn new(
        driver: Arc<dyn CaptureDriver>,
        feedback: FeedbackSignal,
        indicator: Arc<dyn IndicatorSink>,
        notifier: Arc<dyn Notifier>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let session_id = Uuid::new_v4();
        debug!("Capture session {} created", session_id);
        Self {
            session_id,
            mode: CaptureMode::default(),
            phase: CapturePhase::default(),
            driver,
            feedback,
            indicator,
            notifier,
            event_bus,
            pending: VecDeque::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == CapturePhase::Ending
    }

    /// Recordings stopped and not yet resolved by a metadata-write callback
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Push the current mode to the indicator
    pub fn show_mode(&self) {
        self.feedback.show_mode(self.mode);
    }

    pub fn on_button(&mut self, event: &ButtonEvent) {
        match event.action {
            ButtonAction::Down => self.on_button_down(event.key),
            ButtonAction::Up => self.on_button_up(event.key),
            ButtonAction::LongPress => self.on_button_long_press(event.key),
        }
    }

    pub fn on_button_down(&mut self, key: ButtonKey) {
        if key != ButtonKey::Shutter {
            return;
        }

        match (self.phase, self.mode) {
            (CapturePhase::Idle, CaptureMode::Video) => {
                if !self.start_recording() {
                    self.notifier.audio_warning();
                }
            }
            (CapturePhase::Idle, CaptureMode::Photo) => self.take_picture(),
            (CapturePhase::Recording, _) => {
                if !self.stop_recording() {
                    self.notifier.audio_warning();
                }
            }
            (CapturePhase::Capturing, _) => debug!("Still capture in progress, ignoring shutter"),
            (CapturePhase::Ending, _) => debug!("Session ended, ignoring shutter"),
        }
    }

    pub fn on_button_up(&mut self, key: ButtonKey) {
        if key != ButtonKey::Mode {
            return;
        }

        if self.phase != CapturePhase::Idle {
            debug!("Mode toggle ignored while {}", self.phase);
            return;
        }

        if self.driver.is_recorder_active() || self.driver.is_capturing() {
            debug!("Mode toggle ignored, driver busy");
            return;
        }

        self.mode = self.mode.toggled();
        info!("Capture mode: {}", self.mode);
        self.feedback.show_mode(self.mode);
        let _ = self
            .event_bus
            .publish(ShutterlinkEvent::ModeChanged { mode: self.mode });
    }

    pub fn on_button_long_press(&mut self, key: ButtonKey) {
        if key == ButtonKey::Mode {
            self.end_process();
        }
    }

    /// Shutter released by the driver
    pub fn on_shutter(&self) {
        self.notifier.audio_shutter();
    }

    /// Still capture finished; returns the photo artifact for media registration
    pub fn on_picture_taken(&mut self, paths: Vec<PathBuf>) -> Artifact {
        self.notifier.sensor_stop();
        if self.phase == CapturePhase::Capturing {
            self.set_phase(CapturePhase::Idle);
        }
        let artifact = Artifact::photo(self.session_id, paths);
        info!("Picture taken: {} file(s)", artifact.paths.len());
        artifact
    }

    pub fn on_picture_cancelled(&mut self) {
        warn!("Still capture cancelled by driver");
        self.notifier.sensor_stop();
        self.notifier.audio_warning();
        if self.phase == CapturePhase::Capturing {
            self.set_phase(CapturePhase::Idle);
        }
    }

    /// Driver hit its duration or size limit: stop, then start again straight away
    pub fn stop_or_restart_on_limit(&mut self, reason: LimitReason) {
        if self.phase != CapturePhase::Recording {
            debug!("Limit ({}) reported while {}, ignoring", reason, self.phase);
            return;
        }

        info!("Recording limit reached ({}), rolling over", reason);
        if !self.stop_recording() {
            self.notifier.audio_warning();
            return;
        }
        if !self.start_recording() {
            self.notifier.audio_warning();
        }
    }

    /// Tear the session down. Only the first call has any effect.
    pub fn end_process(&mut self) -> bool {
        if self.phase == CapturePhase::Ending {
            debug!("Session already ended");
            return false;
        }

        info!("Ending capture session {}", self.session_id);

        if self.driver.is_recorder_active() {
            self.stop_recording();
        }
        self.driver.close();

        self.set_phase(CapturePhase::Ending);
        true
    }

    /// Oldest stopped recording still waiting on its metadata write
    pub fn take_pending_artifact(&mut self) -> Option<Artifact> {
        self.pending.pop_front()
    }

    fn take_picture(&mut self) {
        if self.driver.is_capturing() {
            debug!("Driver still capturing, ignoring shutter");
            return;
        }

        self.notifier.sensor_start();
        match self.driver.take_picture() {
            Ok(()) => self.set_phase(CapturePhase::Capturing),
            Err(e) => {
                warn!("Still capture refused: {}", e);
                self.notifier.sensor_stop();
                self.notifier.audio_warning();
            }
        }
    }

    fn start_recording(&mut self) -> bool {
        if self.driver.is_recorder_active() {
            warn!("Recorder already active, not starting another recording");
            return false;
        }

        if !self.driver.is_capturing() {
            self.notifier.audio_movie_start();
            self.indicator
                .blink_led(LedTarget::Led7, LedColor::Red, RECORDING_BLINK_MS);
        }
        self.notifier.sensor_start();

        if self.driver.start_recording() {
            self.set_phase(CapturePhase::Recording);
            true
        } else {
            warn!("Driver refused to start recording");
            self.indicator.hide_led(LedTarget::Led7);
            self.notifier.sensor_stop();
            if self.phase == CapturePhase::Recording {
                self.set_phase(CapturePhase::Idle);
            }
            false
        }
    }

    fn stop_recording(&mut self) -> bool {
        let files = self.driver.recorded_files();
        let stopped = self.driver.stop_recording();

        if stopped {
            self.notifier.audio_movie_stop();
        } else {
            warn!("Driver failed to stop recording");
        }
        self.indicator.hide_led(LedTarget::Led7);

        if stopped {
            if files.is_empty() {
                warn!("Recording stopped without reported files");
            } else {
                let artifact = Artifact::video(self.session_id, files);
                if let Some(primary) = artifact.primary() {
                    info!("Recording stopped: {}", primary.display());
                    let _ = self.event_bus.publish(ShutterlinkEvent::ArtifactPending {
                        artifact_id: artifact.id,
                        kind: artifact.kind,
                        primary: primary.display().to_string(),
                    });
                }
                self.pending.push_back(artifact);
            }
        }

        if self.phase == CapturePhase::Recording && !self.driver.is_recorder_active() {
            self.set_phase(CapturePhase::Idle);
        }
        stopped
    }

    fn set_phase(&mut self, to: CapturePhase) {
        let from = self.phase;
        if from == to || from == CapturePhase::Ending {
            return;
        }
        self.phase = to;
        debug!("Phase {} -> {}", from, to);
        let _ = self
            .event_bus
            .publish(ShutterlinkEvent::PhaseChanged { from, to });
    }
}
