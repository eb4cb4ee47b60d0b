mod controller;
mod metadata;
mod types;
#[cfg(test)]
mod tests;

pub use controller::CaptureSessionController;
pub use metadata::{stale_duplicate_path, MetadataWriteHandler};
pub use types::{
    command_channel, Artifact, ArtifactKind, CaptureMode, CapturePhase, CommandReceiver,
    CommandSender, SessionCommand, ShutdownReason,
};
