use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShutterlinkConfig {
    pub device: DeviceConfig,
    pub upload: UploadConfig,
    pub input: InputConfig,
    pub recording: RecordingConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeviceConfig {
    /// Device model name, used to pick the indicator strategy
    #[serde(default = "default_model")]
    pub model: String,

    /// Absolute path of the shared media root; stripped before media index updates
    #[serde(default = "default_storage_root")]
    pub storage_root: String,

    /// sysfs LED class directory (e.g. /sys/class/leds); indicator calls are logged when unset
    #[serde(default)]
    pub led_root: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    /// Fixed upload endpoint
    #[serde(default = "default_upload_url")]
    pub url: String,

    /// Multipart form field carrying the file
    #[serde(default = "default_field_name")]
    pub field_name: String,

    /// Ceiling applied to connect, read and write phases
    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u64,

    /// Total attempts per artifact on transport failure (1 disables retry)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts when retry is enabled
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InputConfig {
    /// evdev button device path
    #[serde(default = "default_input_device")]
    pub device: String,

    /// Hold time before a press becomes a long press
    #[serde(default = "default_long_press")]
    pub long_press_ms: u64,

    /// evdev key code of the shutter button (KEY_CAMERA)
    #[serde(default = "default_shutter_key")]
    pub shutter_key_code: u16,

    /// evdev key code of the mode/record button (KEY_RECORD)
    #[serde(default = "default_mode_key")]
    pub mode_key_code: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RecordingConfig {
    /// Maximum recording duration before the driver reports a limit
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,

    /// Simulated still capture latency
    #[serde(default = "default_picture_delay")]
    pub picture_delay_ms: u64,

    /// Simulated metadata write latency after a recording stops
    #[serde(default = "default_metadata_delay")]
    pub metadata_delay_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Upper bound on draining callbacks and uploads after teardown
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,

    /// Media index journal file name, relative to the storage root
    #[serde(default = "default_media_journal")]
    pub media_journal: String,
}

impl ShutterlinkConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("shutterlink.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("device.model", default_model())?
            .set_default("device.storage_root", default_storage_root())?
            .set_default("upload.url", default_upload_url())?
            .set_default("upload.field_name", default_field_name())?
            .set_default("upload.timeout_secs", default_upload_timeout())?
            .set_default("upload.max_attempts", default_max_attempts())?
            .set_default("upload.retry_delay_ms", default_retry_delay())?
            .set_default("input.device", default_input_device())?
            .set_default("input.long_press_ms", default_long_press())?
            .set_default("input.shutter_key_code", default_shutter_key() as i64)?
            .set_default("input.mode_key_code", default_mode_key() as i64)?
            .set_default("recording.max_duration_secs", default_max_duration())?
            .set_default("recording.picture_delay_ms", default_picture_delay())?
            .set_default("recording.metadata_delay_ms", default_metadata_delay())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .set_default("system.shutdown_grace_secs", default_shutdown_grace())?
            .set_default("system.media_journal", default_media_journal())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with SHUTTERLINK_ prefix, e.g. SHUTTERLINK_UPLOAD__URL
            .add_source(
                Environment::with_prefix("SHUTTERLINK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: ShutterlinkConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.storage_root.is_empty() {
            return Err(ConfigError::Message(
                "Device storage_root must not be empty".to_string(),
            ));
        }

        if self.upload.url.is_empty() {
            return Err(ConfigError::Message(
                "Upload url must not be empty".to_string(),
            ));
        }

        if !self.upload.url.starts_with("http://") && !self.upload.url.starts_with("https://") {
            return Err(ConfigError::Message(format!(
                "Upload url must be http or https: {}",
                self.upload.url
            )));
        }

        if self.upload.field_name.is_empty() {
            return Err(ConfigError::Message(
                "Upload field_name must not be empty".to_string(),
            ));
        }

        if self.upload.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Upload timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.upload.max_attempts == 0 {
            return Err(ConfigError::Message(
                "Upload max_attempts must be at least 1".to_string(),
            ));
        }

        if self.input.long_press_ms == 0 {
            return Err(ConfigError::Message(
                "Input long_press_ms must be greater than 0".to_string(),
            ));
        }

        if self.input.shutter_key_code == self.input.mode_key_code {
            return Err(ConfigError::Message(
                "Shutter and mode keys must differ".to_string(),
            ));
        }

        if self.recording.max_duration_secs == 0 {
            return Err(ConfigError::Message(
                "Recording max_duration_secs must be greater than 0".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl InputConfig {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

impl SystemConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for ShutterlinkConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig {
                model: default_model(),
                storage_root: default_storage_root(),
                led_root: None,
            },
            upload: UploadConfig {
                url: default_upload_url(),
                field_name: default_field_name(),
                timeout_secs: default_upload_timeout(),
                max_attempts: default_max_attempts(),
                retry_delay_ms: default_retry_delay(),
            },
            input: InputConfig {
                device: default_input_device(),
                long_press_ms: default_long_press(),
                shutter_key_code: default_shutter_key(),
                mode_key_code: default_mode_key(),
            },
            recording: RecordingConfig {
                max_duration_secs: default_max_duration(),
                picture_delay_ms: default_picture_delay(),
                metadata_delay_ms: default_metadata_delay(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
                shutdown_grace_secs: default_shutdown_grace(),
                media_journal: default_media_journal(),
            },
        }
    }
}

// Default value functions
fn default_model() -> String {
    "RICOH THETA V".to_string()
}
fn default_storage_root() -> String {
    "/storage/emulated/0".to_string()
}

fn default_upload_url() -> String {
    "http://upload.example.com/v1/upload".to_string()
}
fn default_field_name() -> String {
    "data".to_string()
}
fn default_upload_timeout() -> u64 {
    600
}
fn default_max_attempts() -> u32 {
    1
}
fn default_retry_delay() -> u64 {
    5000
}

fn default_input_device() -> String {
    "/dev/input/event0".to_string()
}
fn default_long_press() -> u64 {
    1000
}
fn default_shutter_key() -> u16 {
    212
}
fn default_mode_key() -> u16 {
    167
}

fn default_max_duration() -> u64 {
    300
}
fn default_picture_delay() -> u64 {
    500
}
fn default_metadata_delay() -> u64 {
    800
}

fn default_event_bus_capacity() -> usize {
    100
}
fn default_shutdown_grace() -> u64 {
    30
}
fn default_media_journal() -> String {
    "media_index.jsonl".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ShutterlinkConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.upload.timeout(), Duration::from_secs(600));
        assert_eq!(config.upload.max_attempts, 1);
        assert_eq!(config.upload.field_name, "data");
        assert!(config.device.led_root.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[device]
model = "RICOH THETA Z1"
storage_root = "/mnt/media"

[upload]
url = "https://uploads.internal/v1/upload"
max_attempts = 3
"#
        )
        .unwrap();

        let config = ShutterlinkConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.device.model, "RICOH THETA Z1");
        assert_eq!(config.device.storage_root, "/mnt/media");
        assert_eq!(config.upload.url, "https://uploads.internal/v1/upload");
        assert_eq!(config.upload.max_attempts, 3);
        // untouched sections keep their defaults
        assert_eq!(config.input.long_press_ms, 1000);
        assert_eq!(config.system.event_bus_capacity, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ShutterlinkConfig::load_from_file("/nonexistent/shutterlink.toml").unwrap();
        assert_eq!(config.device.model, "RICOH THETA V");
        assert_eq!(config.upload.timeout_secs, 600);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ShutterlinkConfig::default();

        config.upload.url = "ftp://upload.example.com".to_string();
        assert!(config.validate().is_err());

        config.upload.url = "http://upload.example.com/v1/upload".to_string();
        config.upload.max_attempts = 0;
        assert!(config.validate().is_err());

        config.upload.max_attempts = 2;
        config.input.mode_key_code = config.input.shutter_key_code;
        assert!(config.validate().is_err());

        config.input.mode_key_code = 167;
        config.system.event_bus_capacity = 0;
        assert!(config.validate().is_err());

        config.system.event_bus_capacity = 8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serializes_to_toml() {
        let config = ShutterlinkConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[upload]"));
        assert!(text.contains("field_name = \"data\""));
    }
}
