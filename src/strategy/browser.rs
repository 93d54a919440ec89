//! Save-as flow for a browser page.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};

use super::{DownloadOutcome, DownloadStrategy, StrategyError};
use crate::filename::resolve_filename;
use crate::host::{Blob, BrowserDocument, HostError, Notifier, ReferenceUrl, Toast, ToastIcon};
use crate::transfer::{JobId, TransferClient};

/// Wait between clicking the save anchor and revoking its reference URL, so
/// the browser has started reading the blob.
pub const REFERENCE_URL_RELEASE_DELAY: Duration = Duration::from_millis(100);

const SUCCESS_TOAST_DURATION: Duration = Duration::from_millis(3000);
const FAILURE_TOAST_DURATION: Duration = Duration::from_millis(2000);

/// Fetches the artifact into memory and offers it through a save-as anchor.
///
/// Failures never leave this strategy: they are logged, shown as a toast and
/// returned as [`DownloadOutcome::Failed`].
pub struct BrowserStrategy {
    client: TransferClient,
    document: Arc<dyn BrowserDocument>,
    notifier: Arc<dyn Notifier>,
}

impl BrowserStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(
        client: TransferClient,
        document: Arc<dyn BrowserDocument>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            document,
            notifier,
        }
    }

    async fn save_as(&self, job_id: &JobId) -> Result<(String, usize), StrategyError> {
        let artifact = self.client.fetch_artifact(job_id).await?;
        let filename = resolve_filename(artifact.disposition.as_deref());
        let size = artifact.bytes.len();
        info!(filename = %filename, size, "artifact ready for save-as");

        let blob = Blob {
            bytes: artifact.bytes,
            mime_type: artifact.content_type.unwrap_or_default(),
        };
        let url = self.document.create_reference_url(blob)?;

        if let Err(e) = self.trigger_save(&url, &filename) {
            self.document.revoke_reference_url(&url);
            return Err(e.into());
        }

        tokio::time::sleep(REFERENCE_URL_RELEASE_DELAY).await;
        self.document.revoke_reference_url(&url);
        debug!(url = %url, "reference URL released");

        Ok((filename, size))
    }

    /// Attaches, clicks and detaches the anchor. The anchor is detached even
    /// when the click fails.
    fn trigger_save(&self, url: &ReferenceUrl, filename: &str) -> Result<(), HostError> {
        let anchor = self.document.attach_download_anchor(&url.0, filename)?;
        let clicked = self.document.click_anchor(anchor);
        self.document.detach_anchor(anchor);
        clicked
    }
}

#[async_trait]
impl DownloadStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        "browser"
    }

    #[instrument(skip(self), fields(job_id = %job_id))]
    async fn present_download(&self, job_id: &JobId) -> Result<DownloadOutcome, StrategyError> {
        match self.save_as(job_id).await {
            Ok((filename, size)) => {
                self.notifier.show_toast(Toast {
                    title: format!("Downloaded: {filename}"),
                    icon: ToastIcon::Success,
                    duration: SUCCESS_TOAST_DURATION,
                });
                Ok(DownloadOutcome::Saved { filename, size })
            }
            Err(cause) => {
                error!(error = %cause, "browser download failed");
                self.notifier.show_toast(Toast {
                    title: "Download failed".to_string(),
                    icon: ToastIcon::None,
                    duration: FAILURE_TOAST_DURATION,
                });
                Ok(DownloadOutcome::Failed { cause })
            }
        }
    }
}
