mod mock;
mod simulated;
mod types;

pub use mock::{DriverCall, MockCaptureDriver};
pub use simulated::{SimulatedDriver, SimulatedDriverSettings, CAPTURE_SUBDIR};
pub use types::{CaptureDriver, DriverCallbacks, DriverNotification, LimitReason};
