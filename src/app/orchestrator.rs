use super::types::{Component, ComponentState};
use crate::config::ShutterlinkConfig;
use crate::driver::{CaptureDriver, DriverCallbacks};
use crate::error::{Result, ShutterlinkError};
use crate::events::EventBus;
use crate::feedback::{DeviceModel, FeedbackSignal, IndicatorSink, LoggingFeedback, Notifier};
#[cfg(all(target_os = "linux", feature = "buttons"))]
use crate::input::ButtonInputHandler;
use crate::input::KeyboardInputHandler;
use crate::media::{JournalMediaIndex, MediaIndex};
use crate::session::{
    command_channel, CaptureSessionController, CommandReceiver, CommandSender,
    MetadataWriteHandler, SessionCommand,
};
use crate::upload::ArtifactUploader;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Composition root: owns the session and drains the command queue.
///
/// Button events, driver callbacks and teardown requests all arrive as
/// [`SessionCommand`]s on one queue, so the controller is only ever touched
/// from the run loop.
pub struct ShutterlinkOrchestrator {
    pub(super) config: ShutterlinkConfig,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) controller: CaptureSessionController,
    pub(super) metadata: MetadataWriteHandler,
    pub(super) uploader: ArtifactUploader,

    pub(super) commands: CommandSender,
    pub(super) receiver: Option<CommandReceiver>,

    pub(super) keyboard_handler: Option<KeyboardInputHandler>,
    #[cfg(all(target_os = "linux", feature = "buttons"))]
    pub(super) button_handler: Option<ButtonInputHandler>,

    pub(super) component_states: Arc<Mutex<HashMap<Component, ComponentState>>>,
}

impl ShutterlinkOrchestrator {
    pub fn builder(config: ShutterlinkConfig) -> OrchestratorBuilder {
        OrchestratorBuilder::new(config)
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Handle for feeding commands into the run loop
    pub fn command_sender(&self) -> CommandSender {
        self.commands.clone()
    }

    pub fn controller(&self) -> &CaptureSessionController {
        &self.controller
    }

    pub fn uploader(&self) -> &ArtifactUploader {
        &self.uploader
    }

    pub fn config(&self) -> &ShutterlinkConfig {
        &self.config
    }
}

/// Assembles an orchestrator around a capture driver.
///
/// The command queue exists before the driver does, so a driver can be built
/// with [`OrchestratorBuilder::driver_callbacks`] and handed back in.
pub struct OrchestratorBuilder {
    config: ShutterlinkConfig,
    event_bus: Arc<EventBus>,
    commands: CommandSender,
    receiver: CommandReceiver,
    driver: Option<Arc<dyn CaptureDriver>>,
    indicator: Option<Arc<dyn IndicatorSink>>,
    notifier: Option<Arc<dyn Notifier>>,
    media_index: Option<Arc<dyn MediaIndex>>,
    keyboard: bool,
    buttons: bool,
}

impl OrchestratorBuilder {
    pub fn new(config: ShutterlinkConfig) -> Self {
        let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));
        let (commands, receiver) = command_channel();
        Self {
            config,
            event_bus,
            commands,
            receiver,
            driver: None,
            indicator: None,
            notifier: None,
            media_index: None,
            keyboard: false,
            buttons: false,
        }
    }

    /// Callbacks that enqueue driver notifications for the run loop
    pub fn driver_callbacks(&self) -> DriverCallbacks {
        let commands = self.commands.clone();
        DriverCallbacks::new(move |notification| {
            if commands.send(SessionCommand::Driver(notification)).is_err() {
                debug!("Session queue closed, dropping driver callback");
            }
        })
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn with_driver(mut self, driver: Arc<dyn CaptureDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn with_indicator(mut self, indicator: Arc<dyn IndicatorSink>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_media_index(mut self, media_index: Arc<dyn MediaIndex>) -> Self {
        self.media_index = Some(media_index);
        self
    }

    /// Terminal key handler, off by default
    pub fn with_keyboard(mut self, enabled: bool) -> Self {
        self.keyboard = enabled;
        self
    }

    /// Hardware button handler, off by default
    pub fn with_buttons(mut self, enabled: bool) -> Self {
        self.buttons = enabled;
        self
    }

    pub fn build(self) -> Result<ShutterlinkOrchestrator> {
        let driver = self
            .driver
            .ok_or_else(|| ShutterlinkError::system("No capture driver configured"))?;
        let indicator: Arc<dyn IndicatorSink> =
            self.indicator.unwrap_or_else(|| Arc::new(LoggingFeedback));
        let notifier: Arc<dyn Notifier> = self.notifier.unwrap_or_else(|| Arc::new(LoggingFeedback));
        let media_index: Arc<dyn MediaIndex> = match self.media_index {
            Some(media_index) => media_index,
            None => Arc::new(JournalMediaIndex::new(
                Path::new(&self.config.device.storage_root).join(&self.config.system.media_journal),
            )),
        };

        let model = DeviceModel::from_name(&self.config.device.model);
        let feedback = FeedbackSignal::new(&model, Arc::clone(&indicator));

        let uploader = ArtifactUploader::new(
            &self.config.upload,
            Arc::clone(&notifier),
            Arc::clone(&self.event_bus),
        )?;

        let metadata = MetadataWriteHandler::new(
            self.config.device.storage_root.clone(),
            uploader.clone(),
            Arc::clone(&notifier),
            media_index,
            Arc::clone(&self.event_bus),
        );

        let controller = CaptureSessionController::new(
            driver,
            feedback,
            indicator,
            notifier,
            Arc::clone(&self.event_bus),
        );

        let keyboard_handler = self
            .keyboard
            .then(|| KeyboardInputHandler::new(self.commands.clone()));

        #[cfg(all(target_os = "linux", feature = "buttons"))]
        let button_handler = self
            .buttons
            .then(|| ButtonInputHandler::new(&self.config.input, self.commands.clone()));
        #[cfg(not(all(target_os = "linux", feature = "buttons")))]
        {
            if self.buttons {
                tracing::warn!("Button input requested but not available in this build");
            }
        }

        Ok(ShutterlinkOrchestrator {
            config: self.config,
            event_bus: self.event_bus,
            controller,
            metadata,
            uploader,
            commands: self.commands,
            receiver: Some(self.receiver),
            keyboard_handler,
            #[cfg(all(target_os = "linux", feature = "buttons"))]
            button_handler,
            component_states: Arc::new(Mutex::new(HashMap::new())),
        })
    }
}
