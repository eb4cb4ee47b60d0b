use super::types::{LedColor, LedTarget, TextArea};
use tracing::{error, info, warn};

/// Indicator primitives. Best-effort; failures are logged by the implementation.
pub trait IndicatorSink: Send + Sync {
    fn show_led(&self, target: LedTarget);
    fn hide_led(&self, target: LedTarget);
    fn blink_led(&self, target: LedTarget, color: LedColor, period_ms: u32);
    fn show_text(&self, area: TextArea, text: &str);
}

/// Audio, sensor and error cues. Best-effort.
pub trait Notifier: Send + Sync {
    fn audio_shutter(&self);
    fn audio_movie_start(&self);
    fn audio_movie_stop(&self);
    /// "Operation cancelled" cue
    fn audio_warning(&self);
    /// Sensor busy indicator on
    fn sensor_start(&self);
    /// Sensor busy indicator off
    fn sensor_stop(&self);
    /// User-visible error channel, shared by every failure kind
    fn error_occurred(&self);
}

/// Feedback that only logs, for hosts without indicator hardware
#[derive(Debug, Default, Clone)]
pub struct LoggingFeedback;

impl IndicatorSink for LoggingFeedback {
    fn show_led(&self, target: LedTarget) {
        info!("LED {} on", target.name());
    }

    fn hide_led(&self, target: LedTarget) {
        info!("LED {} off", target.name());
    }

    fn blink_led(&self, target: LedTarget, color: LedColor, period_ms: u32) {
        info!(
            "LED {} blinking {:?} every {} ms",
            target.name(),
            color,
            period_ms
        );
    }

    fn show_text(&self, area: TextArea, text: &str) {
        info!("Display {:?}: {}", area, text);
    }
}

impl Notifier for LoggingFeedback {
    fn audio_shutter(&self) {
        info!("Cue: shutter");
    }

    fn audio_movie_start(&self) {
        info!("Cue: movie start");
    }

    fn audio_movie_stop(&self) {
        info!("Cue: movie stop");
    }

    fn audio_warning(&self) {
        warn!("Cue: operation cancelled");
    }

    fn sensor_start(&self) {
        info!("Sensor busy");
    }

    fn sensor_stop(&self) {
        info!("Sensor idle");
    }

    fn error_occurred(&self) {
        error!("Cue: error occurred");
    }
}
