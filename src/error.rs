use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShutterlinkError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("System error: {message}")]
    System { message: String },
}

impl ShutterlinkError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Errors reported by the capture driver
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Driver refused to start capture: {details}")]
    StartRefused { details: String },

    #[error("Capture already in progress")]
    Busy,

    #[error("Driver has been closed")]
    Closed,

    #[error("Failed to write capture file {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the artifact uploader
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to read artifact {path}: {source}")]
    ReadArtifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact path: {0}")]
    InvalidPath(String),

    #[error("Failed to build upload request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Transport failure uploading {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Upload of {path} made no progress for {idle:?}")]
    Stalled { path: String, idle: std::time::Duration },
}

impl UploadError {
    /// Network-level failures, the only ones a retry can help with
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Stalled { .. })
    }
}

/// Errors from button input sources
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to open input device {device}: {details}")]
    DeviceOpen { device: String, details: String },

    #[error("Input device not found: {0}")]
    DeviceNotFound(String),

    #[error("Permission denied for input device: {0}")]
    PermissionDenied(String),

    #[error("Input device read error: {details}")]
    DeviceRead { details: String },

    #[error("Input device {0} does not report key events")]
    UnsupportedDevice(String),

    #[error("Terminal input error: {0}")]
    Terminal(String),
}

/// Errors from indicator sinks
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Failed to write LED attribute {path}: {source}")]
    LedWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the event bus
#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },
}

pub type Result<T> = std::result::Result<T, ShutterlinkError>;
