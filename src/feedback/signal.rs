use super::sink::IndicatorSink;
use super::types::{DeviceModel, IndicatorStrategy, LedTarget, TextArea};
use crate::session::CaptureMode;
use std::sync::Arc;
use tracing::debug;

/// Translates the capture mode into indicator commands for one device model
#[derive(Clone)]
pub struct FeedbackSignal {
    strategy: IndicatorStrategy,
    sink: Arc<dyn IndicatorSink>,
}

impl FeedbackSignal {
    pub fn new(model: &DeviceModel, sink: Arc<dyn IndicatorSink>) -> Self {
        let strategy = IndicatorStrategy::for_model(model);
        debug!("Indicator strategy for {:?}: {:?}", model, strategy);
        Self { strategy, sink }
    }

    pub fn strategy(&self) -> IndicatorStrategy {
        self.strategy
    }

    pub fn show_mode(&self, mode: CaptureMode) {
        match self.strategy {
            IndicatorStrategy::TextDisplay => {
                let text = match mode {
                    CaptureMode::Video => "video",
                    CaptureMode::Photo => "image",
                };
                self.sink.show_text(TextArea::Bottom, text);
            }
            // the lamps are exclusive: hide the other one first
            IndicatorStrategy::Leds => match mode {
                CaptureMode::Video => {
                    self.sink.hide_led(LedTarget::Led4);
                    self.sink.show_led(LedTarget::Led5);
                }
                CaptureMode::Photo => {
                    self.sink.hide_led(LedTarget::Led5);
                    self.sink.show_led(LedTarget::Led4);
                }
            },
        }
    }
}
