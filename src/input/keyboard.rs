use super::types::{ButtonEvent, ButtonKey};
use crate::error::Result;
use crate::session::{CommandSender, ShutdownReason, SessionCommand};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Terminal stand-in for the hardware buttons.
///
/// `s` shutter, `m` mode tap, `l` mode long press, `q`/Esc end.
pub struct KeyboardInputHandler {
    commands: CommandSender,
    cancellation_token: CancellationToken,
}

impl KeyboardInputHandler {
    pub fn new(commands: CommandSender) -> Self {
        Self {
            commands,
            cancellation_token: CancellationToken::new(),
        }
    }

    pub async fn start(&self) -> Result<()> {
        info!("Starting keyboard input handler - s: shutter, m: mode, l: long press, q: quit");

        let commands = self.commands.clone();
        let cancellation_token = self.cancellation_token.clone();

        task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            loop {
                if cancellation_token.is_cancelled() {
                    debug!("Keyboard input handler stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(Event::Key(key_event)) = event::read() else {
                            continue;
                        };
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }

                        let mapped = commands_for_key(key_event.code);
                        if mapped.is_empty() {
                            debug!("Key pressed: {:?}", key_event.code);
                            continue;
                        }

                        let quit = mapped
                            .iter()
                            .any(|command| matches!(command, SessionCommand::End(_)));
                        if mapped.into_iter().any(|command| commands.send(command).is_err()) {
                            debug!("Session queue closed");
                            break;
                        }
                        if quit {
                            info!("Quit key pressed - ending session");
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => warn!("Error polling for keyboard events: {}", e),
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            }
            debug!("Keyboard input handler task exited");
        });

        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = disable_raw_mode();

        Ok(())
    }

    pub fn is_stopped(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}

/// Session commands a terminal key stands for
pub(crate) fn commands_for_key(code: KeyCode) -> Vec<SessionCommand> {
    match code {
        KeyCode::Char('s') | KeyCode::Char(' ') => vec![
            SessionCommand::Button(ButtonEvent::down(ButtonKey::Shutter)),
            SessionCommand::Button(ButtonEvent::up(ButtonKey::Shutter)),
        ],
        KeyCode::Char('m') => vec![
            SessionCommand::Button(ButtonEvent::down(ButtonKey::Mode)),
            SessionCommand::Button(ButtonEvent::up(ButtonKey::Mode)),
        ],
        KeyCode::Char('l') => vec![SessionCommand::Button(ButtonEvent::long_press(
            ButtonKey::Mode,
        ))],
        KeyCode::Char('q') | KeyCode::Esc => vec![SessionCommand::End(ShutdownReason::UserRequest)],
        _ => Vec::new(),
    }
}
