use super::long_press::LongPressTracker;
use super::types::{ButtonEvent, KeyMap};
use crate::config::InputConfig;
use crate::error::{InputError, Result, ShutterlinkError};
use crate::session::{CommandSender, SessionCommand};
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use evdev::{Device, EventType, InputEvent, InputEventKind};

const MAX_CONSECUTIVE_ERRORS: u32 = 5;
const LONG_PRESS_POLL: Duration = Duration::from_millis(50);

/// Hardware button source reading key events with evdev
pub struct ButtonInputHandler {
    pub(crate) device_path: String,
    key_map: KeyMap,
    long_press: Duration,
    commands: CommandSender,
    max_retries: u32,
    retry_delay: Duration,
    cancellation_token: CancellationToken,
}

impl ButtonInputHandler {
    pub fn new(config: &InputConfig, commands: CommandSender) -> Self {
        Self {
            device_path: config.device.clone(),
            key_map: KeyMap::from_config(config),
            long_press: config.long_press(),
            commands,
            max_retries: 10,
            retry_delay: Duration::from_secs(1),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Spawn the monitoring loop; device failures are retried with backoff
    pub async fn start(&self) -> Result<()> {
        info!("Starting button input handler for device: {}", self.device_path);

        let device_path = self.device_path.clone();
        let key_map = self.key_map;
        let long_press = self.long_press;
        let commands = self.commands.clone();
        let max_retries = self.max_retries;
        let retry_delay = self.retry_delay;
        let token = self.cancellation_token.clone();

        tokio::spawn(async move {
            let mut retry_count = 0;

            loop {
                match Self::monitor_device(&device_path, key_map, long_press, &commands, &token)
                    .await
                {
                    Ok(()) => {
                        info!("Button monitoring ended");
                        break;
                    }
                    Err(e) => {
                        error!("Button device error: {}", e);
                        retry_count += 1;

                        if retry_count >= max_retries {
                            error!(
                                "Button input handler failed after {} attempts, giving up",
                                max_retries
                            );
                            break;
                        }

                        let delay = retry_delay * 2_u32.pow(retry_count.min(5));
                        warn!(
                            "Retrying button device in {:?} (attempt {}/{})",
                            delay, retry_count, max_retries
                        );
                        tokio::select! {
                            _ = sleep(delay) => {}
                            _ = token.cancelled() => break,
                        }
                    }
                }
            }
        });

        Ok(())
    }

    pub fn stop(&self) {
        info!("Stopping button input handler");
        self.cancellation_token.cancel();
    }

    async fn monitor_device(
        device_path: &str,
        key_map: KeyMap,
        long_press: Duration,
        commands: &CommandSender,
        token: &CancellationToken,
    ) -> Result<()> {
        let device = Device::open(device_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => InputError::DeviceNotFound(device_path.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                InputError::PermissionDenied(device_path.to_string())
            }
            _ => InputError::DeviceOpen {
                device: device_path.to_string(),
                details: e.to_string(),
            },
        })?;

        info!(
            "Button device opened: {} ({})",
            device_path,
            device.name().unwrap_or("Unknown")
        );

        Self::validate_device(&device, device_path)?;

        let mut stream = device
            .into_event_stream()
            .map_err(|e| InputError::DeviceOpen {
                device: device_path.to_string(),
                details: e.to_string(),
            })?;

        let mut tracker = LongPressTracker::new(long_press);
        let mut ticker = tokio::time::interval(LONG_PRESS_POLL);
        let mut consecutive_errors = 0;

        loop {
            tokio::select! {
                _ = token.cancelled() => return Ok(()),
                _ = ticker.tick() => {
                    for event in tracker.poll(Instant::now()) {
                        if !Self::forward(commands, event) {
                            return Ok(());
                        }
                    }
                }
                next = stream.next_event() => match next {
                    Ok(raw) => {
                        consecutive_errors = 0;
                        if let Some(event) = Self::translate(&mut tracker, &key_map, &raw, Instant::now()) {
                            if !Self::forward(commands, event) {
                                return Ok(());
                            }
                        }
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                            return Err(InputError::DeviceRead {
                                details: format!("too many consecutive errors: {}", e),
                            }
                            .into());
                        }
                        warn!(
                            "Error reading button device (attempt {}): {}",
                            consecutive_errors, e
                        );
                        sleep(Duration::from_millis(100)).await;
                    }
                }
            }
        }
    }

    /// False once the session queue is gone
    fn forward(commands: &CommandSender, event: ButtonEvent) -> bool {
        debug!("Button {:?} {:?}", event.key, event.action);
        commands.send(SessionCommand::Button(event)).is_ok()
    }

    pub(crate) fn validate_device(device: &Device, device_path: &str) -> Result<()> {
        if !device.supported_events().contains(EventType::KEY) {
            return Err(ShutterlinkError::from(InputError::UnsupportedDevice(
                device_path.to_string(),
            )));
        }
        Ok(())
    }

    /// Key value 1 is a press, 0 a release; autorepeat (2) is dropped
    pub(crate) fn translate(
        tracker: &mut LongPressTracker,
        key_map: &KeyMap,
        raw: &InputEvent,
        now: Instant,
    ) -> Option<ButtonEvent> {
        let InputEventKind::Key(key) = raw.kind() else {
            return None;
        };
        let button = key_map.key_for(key.code());
        match raw.value() {
            1 => tracker.press(button, now),
            0 => tracker.release(button, now),
            _ => None,
        }
    }
}
