mod types;
mod uploader;

pub use types::{RetryPolicy, UploadJob, UploadStatus};
pub use uploader::ArtifactUploader;
