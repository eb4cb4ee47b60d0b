use super::{Component, ComponentState, ShutterlinkOrchestrator};
use crate::error::Result;
use tracing::{error, info};

impl ShutterlinkOrchestrator {
    /// Start input sources and push the initial mode to the indicator
    pub async fn start(&mut self) -> Result<()> {
        info!(
            "Starting Shutterlink for {} (storage root {})",
            self.config.device.model, self.config.device.storage_root
        );

        #[cfg(all(target_os = "linux", feature = "buttons"))]
        {
            if let Some(button_handler) = &self.button_handler {
                self.set_component_state(Component::Buttons, ComponentState::Starting)
                    .await;

                button_handler.start().await.map_err(|e| {
                    error!("Failed to start button input handler: {}", e);
                    e
                })?;

                self.set_component_state(Component::Buttons, ComponentState::Running)
                    .await;
            }
        }

        if let Some(keyboard_handler) = &self.keyboard_handler {
            self.set_component_state(Component::Keyboard, ComponentState::Starting)
                .await;

            keyboard_handler.start().await.map_err(|e| {
                error!("Failed to start keyboard handler: {}", e);
                e
            })?;

            self.set_component_state(Component::Keyboard, ComponentState::Running)
                .await;
        }

        self.controller.show_mode();
        self.set_component_state(Component::Session, ComponentState::Running)
            .await;

        info!(
            "Capture session {} ready in {} mode",
            self.controller.session_id(),
            self.controller.mode()
        );
        Ok(())
    }
}
