use super::types::CaptureDriver;
use crate::error::DriverError;
use parking_lot::Mutex;
use std::path::PathBuf;

/// Calls recorded by [`MockCaptureDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    TakePicture,
    StartRecording,
    StopRecording,
    Close,
}

struct MockState {
    calls: Vec<DriverCall>,
    recorder_active: bool,
    capturing: bool,
    refuse_start: bool,
    refuse_stop: bool,
    refuse_picture: bool,
    recordings: u32,
    file_dir: PathBuf,
}

/// Scriptable driver for exercising the session without hardware.
///
/// Callbacks are never raised; tests deliver them by hand.
pub struct MockCaptureDriver {
    state: Mutex<MockState>,
}

impl MockCaptureDriver {
    pub fn new(file_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: Mutex::new(MockState {
                calls: Vec::new(),
                recorder_active: false,
                capturing: false,
                refuse_start: false,
                refuse_stop: false,
                refuse_picture: false,
                recordings: 0,
                file_dir: file_dir.into(),
            }),
        }
    }

    pub fn refuse_start(&self, refuse: bool) {
        self.state.lock().refuse_start = refuse;
    }

    pub fn refuse_stop(&self, refuse: bool) {
        self.state.lock().refuse_stop = refuse;
    }

    pub fn refuse_picture(&self, refuse: bool) {
        self.state.lock().refuse_picture = refuse;
    }

    /// Simulate the driver's capture-in-progress flag
    pub fn set_capturing(&self, capturing: bool) {
        self.state.lock().capturing = capturing;
    }

    /// Simulate a recorder started outside the session
    pub fn set_recorder_active(&self, active: bool) {
        self.state.lock().recorder_active = active;
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, call: DriverCall) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == call).count()
    }
}

impl CaptureDriver for MockCaptureDriver {
    fn take_picture(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.calls.push(DriverCall::TakePicture);
        if state.refuse_picture {
            return Err(DriverError::StartRefused {
                details: "mock refused still capture".to_string(),
            });
        }
        state.capturing = true;
        Ok(())
    }

    fn start_recording(&self) -> bool {
        let mut state = self.state.lock();
        state.calls.push(DriverCall::StartRecording);
        if state.refuse_start || state.recorder_active {
            return false;
        }
        state.recordings += 1;
        state.recorder_active = true;
        true
    }

    fn stop_recording(&self) -> bool {
        let mut state = self.state.lock();
        state.calls.push(DriverCall::StopRecording);
        if state.refuse_stop || !state.recorder_active {
            return false;
        }
        state.recorder_active = false;
        true
    }

    fn is_recorder_active(&self) -> bool {
        self.state.lock().recorder_active
    }

    fn is_capturing(&self) -> bool {
        self.state.lock().capturing
    }

    fn recorded_files(&self) -> Vec<PathBuf> {
        let state = self.state.lock();
        if !state.recorder_active {
            return Vec::new();
        }
        let name = format!("V{:03}", state.recordings);
        vec![
            state.file_dir.join(format!("{}.MP4", name)),
            state.file_dir.join(format!("{}.WAV", name)),
        ]
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.calls.push(DriverCall::Close);
        state.recorder_active = false;
    }
}
