pub mod app;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod feedback;
pub mod input;
pub mod media;
pub mod session;
pub mod upload;

pub use app::{Component, ComponentState, DrainOutcome, OrchestratorBuilder, ShutterlinkOrchestrator};
pub use config::ShutterlinkConfig;
pub use driver::{
    CaptureDriver, DriverCallbacks, DriverNotification, LimitReason, SimulatedDriver,
    SimulatedDriverSettings,
};
pub use error::{Result, ShutterlinkError};
pub use events::{EventBus, ShutterlinkEvent};
pub use feedback::{
    DeviceModel, FeedbackSignal, IndicatorSink, LoggingFeedback, Notifier, SysfsLedSink,
};
pub use input::{ButtonAction, ButtonEvent, ButtonKey, KeyboardInputHandler};
pub use media::{JournalMediaIndex, MediaIndex};
pub use session::{
    Artifact, ArtifactKind, CaptureMode, CapturePhase, CaptureSessionController,
    MetadataWriteHandler, SessionCommand, ShutdownReason,
};
pub use upload::{ArtifactUploader, RetryPolicy, UploadJob, UploadStatus};
