use super::sink::{IndicatorSink, Notifier};
use super::types::{LedColor, LedTarget, TextArea};
use parking_lot::Mutex;

/// One call made to [`RecordingFeedback`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackCall {
    ShowLed(LedTarget),
    HideLed(LedTarget),
    BlinkLed(LedTarget, LedColor, u32),
    ShowText(TextArea, String),
    AudioShutter,
    AudioMovieStart,
    AudioMovieStop,
    AudioWarning,
    SensorStart,
    SensorStop,
    ErrorOccurred,
}

/// Feedback collaborator that records every call for assertions
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    calls: Mutex<Vec<FeedbackCall>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<FeedbackCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &FeedbackCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: FeedbackCall) {
        self.calls.lock().push(call);
    }
}

impl IndicatorSink for RecordingFeedback {
    fn show_led(&self, target: LedTarget) {
        self.record(FeedbackCall::ShowLed(target));
    }

    fn hide_led(&self, target: LedTarget) {
        self.record(FeedbackCall::HideLed(target));
    }

    fn blink_led(&self, target: LedTarget, color: LedColor, period_ms: u32) {
        self.record(FeedbackCall::BlinkLed(target, color, period_ms));
    }

    fn show_text(&self, area: TextArea, text: &str) {
        self.record(FeedbackCall::ShowText(area, text.to_string()));
    }
}

impl Notifier for RecordingFeedback {
    fn audio_shutter(&self) {
        self.record(FeedbackCall::AudioShutter);
    }

    fn audio_movie_start(&self) {
        self.record(FeedbackCall::AudioMovieStart);
    }

    fn audio_movie_stop(&self) {
        self.record(FeedbackCall::AudioMovieStop);
    }

    fn audio_warning(&self) {
        self.record(FeedbackCall::AudioWarning);
    }

    fn sensor_start(&self) {
        self.record(FeedbackCall::SensorStart);
    }

    fn sensor_stop(&self) {
        self.record(FeedbackCall::SensorStop);
    }

    fn error_occurred(&self) {
        self.record(FeedbackCall::ErrorOccurred);
    }
}
