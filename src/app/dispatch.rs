use super::ShutterlinkOrchestrator;
use crate::driver::DriverNotification;
use crate::events::ShutterlinkEvent;
use crate::session::{Artifact, SessionCommand, ShutdownReason};
use tracing::{debug, info, warn};

impl ShutterlinkOrchestrator {
    /// Apply one queued command to the session
    pub async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Button(event) => self.controller.on_button(&event),
            SessionCommand::Driver(notification) => self.handle_driver(notification).await,
            SessionCommand::End(reason) => self.end(reason),
        }
    }

    fn end(&mut self, reason: ShutdownReason) {
        let _ = self.event_bus.publish(ShutterlinkEvent::ShutdownRequested {
            reason: reason.to_string(),
        });
        if !self.controller.end_process() {
            debug!("End requested ({}) after session already ended", reason);
        }
    }

    async fn handle_driver(&mut self, notification: DriverNotification) {
        match notification {
            DriverNotification::Shutter => self.controller.on_shutter(),
            DriverNotification::PictureTaken { paths } => {
                let artifact = self.controller.on_picture_taken(paths);
                self.metadata.register_media(&artifact.paths).await;
            }
            DriverNotification::PictureCancelled => self.controller.on_picture_cancelled(),
            DriverNotification::LimitReached { reason } => {
                self.controller.stop_or_restart_on_limit(reason)
            }
            DriverNotification::MetadataWritten { paths } => {
                let artifact = match self.controller.take_pending_artifact() {
                    Some(pending) => pending.with_reported_paths(paths),
                    None if paths.is_empty() => {
                        warn!("Metadata written with no pending recording and no files");
                        return;
                    }
                    None => {
                        info!("Metadata written for a recording this session did not stop");
                        Artifact::video(self.controller.session_id(), paths)
                    }
                };
                // the upload keeps running on its own
                let _ = self.metadata.on_success(&artifact).await;
            }
            DriverNotification::MetadataWriteFailed => {
                match self.controller.take_pending_artifact() {
                    Some(pending) => self.metadata.on_failure(&pending).await,
                    None => self.metadata.on_unattributed_failure(),
                }
            }
        }
    }
}
