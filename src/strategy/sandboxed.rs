//! Open-from-temp flow for a sandboxed mini-app.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::{DownloadOutcome, DownloadStrategy, StrategyError, download_to_ephemeral};
use crate::host::HostFileSystem;
use crate::transfer::{JobId, TransferClient};

/// Downloads to ephemeral storage and opens the file from there.
///
/// The sandbox forbids writes outside temp storage, so there is no persist
/// phase.
pub struct SandboxedAppStrategy {
    client: TransferClient,
    files: Arc<dyn HostFileSystem>,
}

impl SandboxedAppStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(client: TransferClient, files: Arc<dyn HostFileSystem>) -> Self {
        Self { client, files }
    }
}

#[async_trait]
impl DownloadStrategy for SandboxedAppStrategy {
    fn name(&self) -> &'static str {
        "sandboxed-app"
    }

    #[instrument(skip(self), fields(job_id = %job_id))]
    async fn present_download(&self, job_id: &JobId) -> Result<DownloadOutcome, StrategyError> {
        let url = self.client.download_url(job_id);
        let temp_path = download_to_ephemeral(self.files.as_ref(), &url).await?;

        self.files.open_document(&temp_path, true).await?;
        info!(path = %temp_path, "document opened from ephemeral storage");
        Ok(DownloadOutcome::Opened { path: temp_path })
    }
}
