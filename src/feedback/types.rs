use serde::{Deserialize, Serialize};

/// Physical indicator LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedTarget {
    /// Still-mode lamp
    Led4,
    /// Video-mode lamp
    Led5,
    /// Recording lamp
    Led7,
}

impl LedTarget {
    /// Name of the LED class device
    pub fn name(&self) -> &'static str {
        match self {
            LedTarget::Led4 => "led4",
            LedTarget::Led5 => "led5",
            LedTarget::Led7 => "led7",
        }
    }
}

/// Only red is driven; the record lamp blinks red while recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedColor {
    Red,
}

/// Regions of an on-device text display; the mode sits in the bottom line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextArea {
    Bottom,
}

/// Known device models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceModel {
    ThetaV,
    ThetaZ1,
    Other(String),
}

impl DeviceModel {
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_uppercase();
        if normalized.ends_with("Z1") {
            DeviceModel::ThetaZ1
        } else if normalized.ends_with("THETA V") || normalized == "V" {
            DeviceModel::ThetaV
        } else {
            DeviceModel::Other(name.trim().to_string())
        }
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        match self {
            DeviceModel::ThetaZ1 => DeviceCapabilities { text_display: true },
            DeviceModel::ThetaV | DeviceModel::Other(_) => {
                DeviceCapabilities { text_display: false }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub text_display: bool,
}

/// How the current mode is shown on a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorStrategy {
    TextDisplay,
    Leds,
}

impl IndicatorStrategy {
    pub fn for_model(model: &DeviceModel) -> Self {
        if model.capabilities().text_display {
            IndicatorStrategy::TextDisplay
        } else {
            IndicatorStrategy::Leds
        }
    }
}
