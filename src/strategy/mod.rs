//! Download-completion strategies.
//!
//! A finished job becomes a user-visible file in one of three ways, depending
//! on the runtime the crate is embedded in:
//!
//! - [`BrowserStrategy`] - fetch into memory, hand a reference URL to a save-as
//!   anchor, notify. Never fails outward.
//! - [`InstalledAppStrategy`] - download to ephemeral storage, persist, open.
//! - [`SandboxedAppStrategy`] - download to ephemeral storage, open from there.
//!
//! All three implement [`DownloadStrategy`]. [`select_strategy`] picks one
//! from the [`PlatformCapabilities`] the embedding runtime injects, so callers
//! only ever call [`DownloadStrategy::present_download`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ragflow_transfer::host::native::NativeFileSystem;
//! use ragflow_transfer::strategy::{PlatformCapabilities, select_strategy};
//! use ragflow_transfer::{ClientConfig, JobId, TransferClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TransferClient::new(ClientConfig::from_env()?);
//! let files = Arc::new(NativeFileSystem::new("./documents"));
//! let strategy = select_strategy(client, PlatformCapabilities::InstalledApp { files });
//!
//! let outcome = strategy.present_download(&JobId::from_service("job-1")).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod browser;
mod error;
mod installed;
mod sandboxed;

pub use browser::{BrowserStrategy, REFERENCE_URL_RELEASE_DELAY};
pub use error::StrategyError;
pub use installed::{InstalledAppStrategy, encode_uri};
pub use sandboxed::SandboxedAppStrategy;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::host::{BrowserDocument, EphemeralFile, HostFileSystem, Notifier};
use crate::transfer::{JobId, TransferClient};

/// HTTP status a host download must finish with to count as a success.
const DOWNLOAD_OK: u16 = 200;

/// What a strategy did with a finished job.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The browser was handed the artifact to save.
    Saved {
        /// Name offered in the save-as dialog.
        filename: String,
        /// Artifact size in bytes.
        size: usize,
    },
    /// A local file was opened in the document viewer.
    Opened {
        /// Host path of the opened file.
        path: String,
    },
    /// The browser flow failed; the user has already been notified.
    Failed {
        /// What went wrong.
        cause: StrategyError,
    },
}

/// Turns a finished job into a file the user can see.
#[async_trait]
pub trait DownloadStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Retrieves the artifact of `job_id` and presents it.
    async fn present_download(&self, job_id: &JobId) -> Result<DownloadOutcome, StrategyError>;
}

/// Capabilities of the runtime the crate runs in.
#[derive(Clone)]
pub enum PlatformCapabilities {
    /// Browser page.
    Browser {
        /// Page document.
        document: Arc<dyn BrowserDocument>,
        /// Toast surface.
        notifier: Arc<dyn Notifier>,
    },
    /// Installed native application.
    InstalledApp {
        /// App file system.
        files: Arc<dyn HostFileSystem>,
    },
    /// Sandboxed mini-application (temp storage only).
    SandboxedApp {
        /// App file system.
        files: Arc<dyn HostFileSystem>,
    },
}

impl fmt::Debug for PlatformCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runtime = match self {
            Self::Browser { .. } => "Browser",
            Self::InstalledApp { .. } => "InstalledApp",
            Self::SandboxedApp { .. } => "SandboxedApp",
        };
        f.debug_tuple("PlatformCapabilities").field(&runtime).finish()
    }
}

/// Builds the strategy matching `capabilities`.
#[must_use]
pub fn select_strategy(
    client: TransferClient,
    capabilities: PlatformCapabilities,
) -> Box<dyn DownloadStrategy> {
    debug!(?capabilities, "selecting download strategy");
    match capabilities {
        PlatformCapabilities::Browser { document, notifier } => {
            Box::new(BrowserStrategy::new(client, document, notifier))
        }
        PlatformCapabilities::InstalledApp { files } => {
            Box::new(InstalledAppStrategy::new(client, files))
        }
        PlatformCapabilities::SandboxedApp { files } => {
            Box::new(SandboxedAppStrategy::new(client, files))
        }
    }
}

/// Downloads into ephemeral storage, accepting only a 200 reply.
async fn download_to_ephemeral(
    files: &dyn HostFileSystem,
    url: &str,
) -> Result<String, StrategyError> {
    let EphemeralFile {
        temp_path,
        status_code,
    } = files.download_file(url).await?;
    if status_code != DOWNLOAD_OK {
        return Err(StrategyError::status(status_code));
    }
    debug!(temp_path = %temp_path, "downloaded to ephemeral storage");
    Ok(temp_path)
}
