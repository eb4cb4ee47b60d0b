mod mock;
mod signal;
mod sink;
mod sysfs;
mod types;
#[cfg(test)]
mod tests;

pub use mock::{FeedbackCall, RecordingFeedback};
pub use signal::FeedbackSignal;
pub use sink::{IndicatorSink, LoggingFeedback, Notifier};
pub use sysfs::SysfsLedSink;
pub use types::{
    DeviceCapabilities, DeviceModel, IndicatorStrategy, LedColor, LedTarget, TextArea,
};
