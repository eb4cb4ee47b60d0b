use super::sink::IndicatorSink;
use super::types::{LedColor, LedTarget, TextArea};
use crate::error::IndicatorError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Drives LEDs through the Linux LED class (`/sys/class/leds/<name>/...`).
///
/// Text is not supported by the LED class and is logged instead.
pub struct SysfsLedSink {
    led_root: PathBuf,
}

impl SysfsLedSink {
    pub fn new(led_root: impl Into<PathBuf>) -> Self {
        let led_root = led_root.into();
        info!("Using sysfs LEDs under {}", led_root.display());
        Self { led_root }
    }

    fn attribute(&self, target: LedTarget, attribute: &str) -> PathBuf {
        self.led_root.join(target.name()).join(attribute)
    }

    fn write_attribute(path: &Path, value: &str) -> Result<(), IndicatorError> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| IndicatorError::LedWrite {
                path: path.display().to_string(),
                source: e,
            })?;
        file.write_all(value.as_bytes())
            .map_err(|e| IndicatorError::LedWrite {
                path: path.display().to_string(),
                source: e,
            })
    }

    fn apply(&self, target: LedTarget, writes: &[(&str, String)]) {
        for (attribute, value) in writes {
            let path = self.attribute(target, attribute);
            if let Err(e) = Self::write_attribute(&path, value) {
                warn!("{}", e);
                return;
            }
        }
    }
}

impl IndicatorSink for SysfsLedSink {
    fn show_led(&self, target: LedTarget) {
        self.apply(
            target,
            &[
                ("trigger", "none".to_string()),
                ("brightness", "255".to_string()),
            ],
        );
    }

    fn hide_led(&self, target: LedTarget) {
        self.apply(
            target,
            &[
                ("trigger", "none".to_string()),
                ("brightness", "0".to_string()),
            ],
        );
    }

    fn blink_led(&self, target: LedTarget, color: LedColor, period_ms: u32) {
        // single-colour class devices; the colour is fixed by the hardware
        debug!("Blink colour {:?} requested for {}", color, target.name());
        let half = (period_ms / 2).max(1).to_string();
        self.apply(
            target,
            &[
                ("trigger", "timer".to_string()),
                ("delay_on", half.clone()),
                ("delay_off", half),
            ],
        );
    }

    fn show_text(&self, area: TextArea, text: &str) {
        info!("Display {:?}: {}", area, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn led_dir(root: &Path, target: LedTarget) -> PathBuf {
        let dir = root.join(target.name());
        std::fs::create_dir_all(&dir).unwrap();
        for attribute in ["trigger", "brightness", "delay_on", "delay_off"] {
            std::fs::write(dir.join(attribute), "").unwrap();
        }
        dir
    }

    #[test]
    fn test_show_and_hide_write_brightness() {
        let root = tempfile::tempdir().unwrap();
        let dir = led_dir(root.path(), LedTarget::Led4);
        let sink = SysfsLedSink::new(root.path());

        sink.show_led(LedTarget::Led4);
        assert_eq!(std::fs::read_to_string(dir.join("brightness")).unwrap(), "255");
        assert_eq!(std::fs::read_to_string(dir.join("trigger")).unwrap(), "none");

        sink.hide_led(LedTarget::Led4);
        assert_eq!(std::fs::read_to_string(dir.join("brightness")).unwrap(), "0");
    }

    #[test]
    fn test_blink_uses_timer_trigger() {
        let root = tempfile::tempdir().unwrap();
        let dir = led_dir(root.path(), LedTarget::Led7);
        let sink = SysfsLedSink::new(root.path());

        sink.blink_led(LedTarget::Led7, LedColor::Red, 2000);
        assert_eq!(std::fs::read_to_string(dir.join("trigger")).unwrap(), "timer");
        assert_eq!(std::fs::read_to_string(dir.join("delay_on")).unwrap(), "1000");
        assert_eq!(std::fs::read_to_string(dir.join("delay_off")).unwrap(), "1000");
    }

    #[test]
    fn test_missing_led_is_not_fatal() {
        let root = tempfile::tempdir().unwrap();
        let sink = SysfsLedSink::new(root.path());
        sink.show_led(LedTarget::Led5);
        assert!(!root.path().join("led5").exists());
    }
}
