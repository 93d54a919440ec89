//! Requests against the document service.
//!
//! Four endpoints live under the configured base URL:
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | heartbeat | GET | `/ragflowai/heartbeat` |
//! | upload | POST | `/ragflowai/upload` (multipart `file` or `url`) |
//! | status | GET | `/ragflowai/status/{job_id}` |
//! | download | GET | `/ragflowai/download/{job_id}` |
//!
//! Nothing here retries, backs off or polls. Transport failures surface as
//! [`TransferError`] exactly once.

mod client;
mod error;
mod types;

pub use client::{
    DOWNLOAD_PATH, FILE_PART, HEARTBEAT_PATH, STATUS_PATH, TransferClient, UPLOAD_PATH, URL_PART,
};
pub use error::TransferError;
pub use types::{Artifact, JobDescriptor, JobId, ServiceResponse, UploadSource};
