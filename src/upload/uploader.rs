use super::types::{RetryPolicy, UploadJob, UploadStatus};
use crate::config::UploadConfig;
use crate::error::{Result, UploadError};
use crate::events::{EventBus, ShutterlinkEvent};
use crate::feedback::Notifier;
use futures::StreamExt;
use parking_lot::Mutex;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, warn};

/// Counts a job as in flight from dispatch until its task ends
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Last moment a transfer moved: a body chunk handed to the connection,
/// or the start of the request
struct TransferClock {
    last_progress: Mutex<Instant>,
}

impl TransferClock {
    fn new() -> Self {
        Self {
            last_progress: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_progress.lock() = Instant::now();
    }

    /// Resolves once nothing has moved for `idle`
    async fn stalled(&self, idle: Duration) {
        loop {
            let deadline = *self.last_progress.lock() + idle;
            if Instant::now() >= deadline {
                return;
            }
            sleep_until(deadline).await;
        }
    }
}

/// Fire-and-forget multipart uploader for finished artifacts.
///
/// A local file is deleted as soon as the endpoint answers, whatever the
/// status code; only transport failures keep it on disk. Jobs are not
/// queued or capped.
#[derive(Clone)]
pub struct ArtifactUploader {
    client: reqwest::Client,
    endpoint: String,
    field_name: String,
    idle_timeout: Duration,
    retry: RetryPolicy,
    notifier: Arc<dyn Notifier>,
    event_bus: Arc<EventBus>,
    in_flight: Arc<AtomicUsize>,
}

impl ArtifactUploader {
    pub fn new(
        config: &UploadConfig,
        notifier: Arc<dyn Notifier>,
        event_bus: Arc<EventBus>,
    ) -> Result<Self> {
        // No total deadline; stalls are bounded per send by `idle_timeout`
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .build()
            .map_err(UploadError::Client)?;

        let retry = RetryPolicy::from_config(config);
        debug!(
            "Uploader targeting {} with retry policy {:?}",
            config.url, retry
        );

        Ok(Self {
            client,
            endpoint: config.url.clone(),
            field_name: config.field_name.clone(),
            idle_timeout: config.timeout(),
            retry,
            notifier,
            event_bus,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Jobs dispatched and not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Dispatch an upload and return immediately.
    ///
    /// The handle may be dropped; the transfer keeps running.
    pub fn upload(&self, path: impl Into<PathBuf>) -> JoinHandle<UploadJob> {
        let job = UploadJob::new(path.into(), self.endpoint.clone());
        info!("POST to storage: {}", job.source.display());

        let guard = InFlightGuard::new(Arc::clone(&self.in_flight));
        let uploader = self.clone();

        tokio::spawn(async move {
            let _guard = guard;
            uploader.execute(job).await
        })
    }

    /// Run one job to completion
    pub async fn execute(&self, mut job: UploadJob) -> UploadJob {
        let max_attempts = self.retry.max_attempts();

        loop {
            job.attempts += 1;

            match self.send_once(&job.source).await {
                Ok(status) => {
                    self.finish_with_response(&mut job, status).await;
                    return job;
                }
                Err(e) if e.is_transport() && job.attempts < max_attempts => {
                    warn!(
                        "{} (attempt {}/{}), retrying in {:?}",
                        e,
                        job.attempts,
                        max_attempts,
                        self.retry.delay()
                    );
                    sleep(self.retry.delay()).await;
                }
                Err(e) => {
                    self.finish_with_failure(&mut job, e);
                    return job;
                }
            }
        }
    }

    async fn send_once(&self, path: &Path) -> std::result::Result<StatusCode, UploadError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::InvalidPath(path.display().to_string()))?;

        let read_error = |e: std::io::Error| UploadError::ReadArtifact {
            path: path.display().to_string(),
            source: e,
        };
        let file = tokio::fs::File::open(path).await.map_err(read_error)?;
        let length = file.metadata().await.map_err(read_error)?.len();

        let clock = Arc::new(TransferClock::new());
        let body_clock = Arc::clone(&clock);
        let chunks = ReaderStream::new(file).inspect(move |_| body_clock.touch());

        let part = Part::stream_with_length(Body::wrap_stream(chunks), length)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(UploadError::Request)?;
        let form = Form::new().part(self.field_name.clone(), part);

        let request = self.client.post(&self.endpoint).multipart(form).send();

        tokio::select! {
            response = request => response
                .map(|response| response.status())
                .map_err(|e| UploadError::Transport {
                    path: path.display().to_string(),
                    source: e,
                }),
            _ = clock.stalled(self.idle_timeout) => Err(UploadError::Stalled {
                path: path.display().to_string(),
                idle: self.idle_timeout,
            }),
        }
    }

    async fn finish_with_response(&self, job: &mut UploadJob, status: StatusCode) {
        info!(
            "Upload {} response={} ({})",
            job.id,
            status.as_u16(),
            job.source.display()
        );

        // The file goes away on any response, error statuses included.
        // Kept on purpose; an error status loses the local copy.
        if !status.is_success() {
            warn!(
                "Endpoint answered {} for {}; removing local file regardless",
                status.as_u16(),
                job.source.display()
            );
        }

        match tokio::fs::remove_file(&job.source).await {
            Ok(()) => debug!("Removed uploaded file {}", job.source.display()),
            Err(e) => warn!(
                "Failed to remove uploaded file {}: {}",
                job.source.display(),
                e
            ),
        }

        job.status = UploadStatus::Succeeded {
            status_code: status.as_u16(),
        };

        let _ = self.event_bus.publish(ShutterlinkEvent::UploadCompleted {
            job_id: job.id,
            path: job.source.display().to_string(),
            status_code: status.as_u16(),
        });
    }

    fn finish_with_failure(&self, job: &mut UploadJob, e: UploadError) {
        error!("Upload {} failed after {} attempt(s): {}", job.id, job.attempts, e);
        self.notifier.error_occurred();

        job.status = UploadStatus::Failed {
            error: e.to_string(),
        };

        let _ = self.event_bus.publish(ShutterlinkEvent::UploadFailed {
            job_id: job.id,
            path: job.source.display().to_string(),
            error: e.to_string(),
        });
    }
}
