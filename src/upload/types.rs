use crate::config::UploadConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Whether a transport failure is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// One attempt; a failure is final
    #[default]
    Never,
    /// Up to `max_attempts` attempts in total, `delay` apart
    Bounded { max_attempts: u32, delay: Duration },
}

impl RetryPolicy {
    pub fn from_config(config: &UploadConfig) -> Self {
        if config.max_attempts <= 1 {
            RetryPolicy::Never
        } else {
            RetryPolicy::Bounded {
                max_attempts: config.max_attempts,
                delay: Duration::from_millis(config.retry_delay_ms),
            }
        }
    }

    pub fn max_attempts(&self) -> u32 {
        match self {
            RetryPolicy::Never => 1,
            RetryPolicy::Bounded { max_attempts, .. } => (*max_attempts).max(1),
        }
    }

    pub fn delay(&self) -> Duration {
        match self {
            RetryPolicy::Never => Duration::ZERO,
            RetryPolicy::Bounded { delay, .. } => *delay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    Pending,
    /// A response arrived. The status code is recorded but not judged.
    Succeeded { status_code: u16 },
    Failed { error: String },
}

/// One outstanding transfer of a local file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadJob {
    pub id: Uuid,
    pub source: PathBuf,
    pub endpoint: String,
    pub status: UploadStatus,
    pub attempts: u32,
}

impl UploadJob {
    pub fn new(source: PathBuf, endpoint: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            endpoint,
            status: UploadStatus::Pending,
            attempts: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.status, UploadStatus::Pending)
    }
}
