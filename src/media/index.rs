use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Registry of media files visible to other applications.
///
/// Paths are relative to the shared media root, with a leading `/`.
#[async_trait]
pub trait MediaIndex: Send + Sync {
    async fn notify_new_media(&self, paths: &[String]) -> Result<()>;
}

/// Express absolute storage paths relative to the media root.
///
/// Paths outside the root are passed through unchanged.
pub fn strip_storage_root(storage_root: &str, paths: &[PathBuf]) -> Vec<String> {
    let root = storage_root.trim_end_matches('/');
    paths
        .iter()
        .map(|path| {
            let full = path.to_string_lossy();
            match full.strip_prefix(root) {
                Some(rest) if !root.is_empty() && (rest.is_empty() || rest.starts_with('/')) => {
                    rest.to_string()
                }
                _ => full.to_string(),
            }
        })
        .collect()
}

/// One journal line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaJournalEntry {
    pub timestamp: DateTime<Utc>,
    pub paths: Vec<String>,
}

/// Media index that appends JSON lines to a journal file
pub struct JournalMediaIndex {
    journal_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JournalMediaIndex {
    pub fn new(journal_path: impl Into<PathBuf>) -> Self {
        Self {
            journal_path: journal_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    /// Read back every entry, oldest first
    pub async fn entries(&self) -> Result<Vec<MediaJournalEntry>> {
        let contents = match tokio::fs::read_to_string(&self.journal_path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl MediaIndex for JournalMediaIndex {
    async fn notify_new_media(&self, paths: &[String]) -> Result<()> {
        let entry = MediaJournalEntry {
            timestamp: Utc::now(),
            paths: paths.to_vec(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.journal_path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(
            "Recorded {} paths in {}",
            paths.len(),
            self.journal_path.display()
        );
        Ok(())
    }
}

/// Media index that keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingMediaIndex {
    notifications: parking_lot::Mutex<Vec<Vec<String>>>,
}

impl RecordingMediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Vec<String>> {
        self.notifications.lock().clone()
    }
}

#[async_trait]
impl MediaIndex for RecordingMediaIndex {
    async fn notify_new_media(&self, paths: &[String]) -> Result<()> {
        self.notifications.lock().push(paths.to_vec());
        Ok(())
    }
}
