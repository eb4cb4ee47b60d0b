use super::types::Artifact;
use crate::events::{EventBus, ShutterlinkEvent};
use crate::feedback::Notifier;
use crate::media::{strip_storage_root, MediaIndex};
use crate::upload::{ArtifactUploader, UploadJob};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Resolves a stopped recording once the driver reports its metadata write
pub struct MetadataWriteHandler {
    storage_root: String,
    uploader: ArtifactUploader,
    notifier: Arc<dyn Notifier>,
    media_index: Arc<dyn MediaIndex>,
    event_bus: Arc<EventBus>,
}

impl MetadataWriteHandler {
    pub fn new(
        storage_root: impl Into<String>,
        uploader: ArtifactUploader,
        notifier: Arc<dyn Notifier>,
        media_index: Arc<dyn MediaIndex>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            storage_root: storage_root.into(),
            uploader,
            notifier,
            media_index,
            event_bus,
        }
    }

    /// Metadata written: upload the media file, drop the muxer's leftover copy,
    /// register every file with the media index.
    pub async fn on_success(&self, artifact: &Artifact) -> Option<JoinHandle<UploadJob>> {
        info!("Metadata written for artifact {}", artifact.id);
        self.notifier.sensor_stop();

        let upload = match artifact.primary() {
            Some(primary) => {
                let handle = self.uploader.upload(primary);
                remove_if_present(&stale_duplicate_path(primary)).await;
                Some(handle)
            }
            None => {
                warn!("Artifact {} has no media file to upload", artifact.id);
                None
            }
        };

        self.register_media(&artifact.paths).await;
        upload
    }

    /// Metadata write failed: the partial media file is removed, nothing is uploaded
    pub async fn on_failure(&self, artifact: &Artifact) {
        error!("Failed to write metadata for artifact {}", artifact.id);

        if let Some(primary) = artifact.primary() {
            match tokio::fs::remove_file(primary).await {
                Ok(()) => info!("Removed partial recording {}", primary.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Partial recording {} already gone", primary.display())
                }
                Err(e) => warn!("Failed to remove {}: {}", primary.display(), e),
            }

            let _ = self.event_bus.publish(ShutterlinkEvent::MetadataWriteFailed {
                artifact_id: artifact.id,
                primary: primary.display().to_string(),
            });
        }

        self.notifier.sensor_stop();
        self.notifier.error_occurred();
    }

    /// Failure callback with no stopped recording to attribute it to
    pub fn on_unattributed_failure(&self) {
        warn!("Metadata write failure reported with no pending recording");
        self.notifier.sensor_stop();
        self.notifier.error_occurred();
    }

    /// Register files with the media index, paths relative to the media root
    pub async fn register_media(&self, paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }

        let relative = strip_storage_root(&self.storage_root, paths);
        match self.media_index.notify_new_media(&relative).await {
            Ok(()) => {
                let _ = self
                    .event_bus
                    .publish(ShutterlinkEvent::MediaIndexed { paths: relative });
            }
            Err(e) => warn!("Failed to update media index: {}", e),
        }
    }
}

/// The muxer leaves `<stem>org.<ext>` next to the finished file
pub fn stale_duplicate_path(primary: &Path) -> PathBuf {
    let stem = primary
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match primary.extension() {
        Some(extension) => format!("{}org.{}", stem, extension.to_string_lossy()),
        None => format!("{}org", stem),
    };
    primary.with_file_name(name)
}

async fn remove_if_present(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed stale duplicate {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove stale duplicate {}: {}", path.display(), e),
    }
}
