use super::types::DrainOutcome;
use super::{Component, ComponentState, ShutterlinkOrchestrator};
use crate::error::Result;
use crate::session::CommandReceiver;
use tokio::time::{sleep, sleep_until, Duration, Instant};
use tracing::{error, info, warn};

const DRAIN_POLL: Duration = Duration::from_millis(50);

impl ShutterlinkOrchestrator {
    /// Keep serving driver callbacks after Ending until nothing is outstanding.
    ///
    /// Bounded by `system.shutdown_grace_secs`.
    pub async fn drain(&mut self, receiver: &mut CommandReceiver) -> DrainOutcome {
        let deadline = Instant::now() + self.config.system.shutdown_grace();

        loop {
            let pending = self.controller.pending_count();
            let in_flight = self.uploader.in_flight();
            if pending == 0 && in_flight == 0 {
                info!("No outstanding recordings or uploads");
                return DrainOutcome::Settled;
            }

            tokio::select! {
                command = receiver.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        warn!("Command queue closed while draining");
                        return DrainOutcome::QueueClosed;
                    }
                },
                _ = sleep(DRAIN_POLL) => {}
                _ = sleep_until(deadline) => {
                    warn!(
                        "Shutdown grace elapsed with {} recording(s) pending and {} upload(s) in flight",
                        pending, in_flight
                    );
                    return DrainOutcome::TimedOut { pending, in_flight };
                }
            }
        }
    }

    /// Stop input sources
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");

        let mut exit_code = 0;

        if let Some(keyboard_handler) = &self.keyboard_handler {
            self.set_component_state(Component::Keyboard, ComponentState::Stopping)
                .await;
            match keyboard_handler.stop().await {
                Ok(()) => {
                    self.set_component_state(Component::Keyboard, ComponentState::Stopped)
                        .await;
                }
                Err(e) => {
                    error!("Error stopping keyboard: {}", e);
                    self.set_component_state(Component::Keyboard, ComponentState::Failed)
                        .await;
                    exit_code = 1;
                }
            }
        }

        #[cfg(all(target_os = "linux", feature = "buttons"))]
        {
            if let Some(button_handler) = &self.button_handler {
                button_handler.stop();
                self.set_component_state(Component::Buttons, ComponentState::Stopped)
                    .await;
            }
        }

        self.set_component_state(Component::Session, ComponentState::Stopped)
            .await;

        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }
}
