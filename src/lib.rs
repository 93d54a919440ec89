//! Client-side broker for a remote document-processing service.
//!
//! Submit a local file or a remote URL, poll the job, then let the download
//! strategy of the current runtime turn the finished artifact into a file the
//! user can see.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Immutable client configuration (base URL, platform flag)
//! - [`transfer`] - Heartbeat, upload, status and artifact requests
//! - [`filename`] - `Content-Disposition` filename resolution
//! - [`host`] - Capability traits the embedding runtime implements
//! - [`strategy`] - Browser, installed-app and sandboxed-app download pipelines
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ragflow_transfer::host::native::NativeFileSystem;
//! use ragflow_transfer::strategy::{PlatformCapabilities, select_strategy};
//! use ragflow_transfer::{ClientConfig, TransferClient, UploadSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TransferClient::new(ClientConfig::from_env()?);
//! let job = client.upload_source(&UploadSource::remote("https://example.com/paper.pdf")).await?;
//!
//! // ... poll `client.get_task_status(&job.job_id)` until the service reports completion ...
//!
//! let files = Arc::new(NativeFileSystem::new("./documents"));
//! let strategy = select_strategy(client, PlatformCapabilities::InstalledApp { files });
//! strategy.present_download(&job.job_id).await?;
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod filename;
pub mod host;
pub mod strategy;
pub mod transfer;
mod user_agent;

// Re-export commonly used types
pub use config::{AppPlatform, ClientConfig, ConfigError, FeatureFlags};
pub use filename::{PLACEHOLDER_FILENAME, resolve_filename};
pub use host::{HostError, HostFileSystem, HostOs};
pub use strategy::{
    DownloadOutcome, DownloadStrategy, PlatformCapabilities, StrategyError, select_strategy,
};
pub use transfer::{
    Artifact, JobDescriptor, JobId, ServiceResponse, TransferClient, TransferError, UploadSource,
};
