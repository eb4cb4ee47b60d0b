use crate::config::InputConfig;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Logical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonKey {
    Shutter,
    /// Mode/record key
    Mode,
    Other(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    Down,
    Up,
    LongPress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub key: ButtonKey,
    pub action: ButtonAction,
    pub timestamp: SystemTime,
}

impl ButtonEvent {
    pub fn new(key: ButtonKey, action: ButtonAction) -> Self {
        Self {
            key,
            action,
            timestamp: SystemTime::now(),
        }
    }

    pub fn down(key: ButtonKey) -> Self {
        Self::new(key, ButtonAction::Down)
    }

    pub fn up(key: ButtonKey) -> Self {
        Self::new(key, ButtonAction::Up)
    }

    pub fn long_press(key: ButtonKey) -> Self {
        Self::new(key, ButtonAction::LongPress)
    }
}

/// Maps raw key codes to logical buttons
#[derive(Debug, Clone, Copy)]
pub struct KeyMap {
    pub shutter_code: u16,
    pub mode_code: u16,
}

impl KeyMap {
    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            shutter_code: config.shutter_key_code,
            mode_code: config.mode_key_code,
        }
    }

    pub fn key_for(&self, code: u16) -> ButtonKey {
        if code == self.shutter_code {
            ButtonKey::Shutter
        } else if code == self.mode_code {
            ButtonKey::Mode
        } else {
            ButtonKey::Other(code)
        }
    }
}
