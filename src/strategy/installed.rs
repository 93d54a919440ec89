//! Save-and-open flow for an installed app.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::{DownloadOutcome, DownloadStrategy, StrategyError, download_to_ephemeral};
use crate::host::{HostFileSystem, HostOs};
use crate::transfer::{JobId, TransferClient};

/// ASCII characters `encode_uri` leaves untouched besides alphanumerics.
const URI_PRESERVED: &str = ";,/?:@&=+$-_.!~*'()#";

/// Percent-encodes a path the way ECMAScript `encodeURI` does: reserved URI
/// characters and alphanumerics stay, everything else becomes `%XX` UTF-8
/// escapes.
///
/// ```
/// use ragflow_transfer::strategy::encode_uri;
///
/// assert_eq!(encode_uri("/tmp/q3 report.pdf"), "/tmp/q3%20report.pdf");
/// ```
#[must_use]
pub fn encode_uri(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut buf = [0u8; 4];
    for ch in path.chars() {
        if ch.is_ascii_alphanumeric() || URI_PRESERVED.contains(ch) {
            out.push(ch);
        } else {
            out.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    out
}

/// Downloads to ephemeral storage, persists the file, then opens it.
///
/// Each phase waits for the previous one. A failing phase aborts the rest;
/// files created by earlier phases are left in place.
pub struct InstalledAppStrategy {
    client: TransferClient,
    files: Arc<dyn HostFileSystem>,
}

impl InstalledAppStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(client: TransferClient, files: Arc<dyn HostFileSystem>) -> Self {
        Self { client, files }
    }
}

#[async_trait]
impl DownloadStrategy for InstalledAppStrategy {
    fn name(&self) -> &'static str {
        "installed-app"
    }

    #[instrument(skip(self), fields(job_id = %job_id))]
    async fn present_download(&self, job_id: &JobId) -> Result<DownloadOutcome, StrategyError> {
        let url = self.client.download_url(job_id);
        let temp_path = download_to_ephemeral(self.files.as_ref(), &url).await?;

        let persist_from = if self.files.os() == HostOs::Ios {
            encode_uri(&temp_path)
        } else {
            temp_path
        };
        let saved_path = self.files.save_file(&persist_from).await?;
        debug!(saved_path = %saved_path, "persisted");

        self.files.open_document(&saved_path, true).await?;
        info!(path = %saved_path, "document opened");
        Ok(DownloadOutcome::Opened { path: saved_path })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uri_keeps_reserved_characters() {
        let path = "file:///var/mobile/Containers/Data/doc-1_(v2).pdf?x=1&y=2#top";
        assert_eq!(encode_uri(path), path);
    }

    #[test]
    fn test_encode_uri_escapes_spaces_unicode_and_percent() {
        assert_eq!(
            encode_uri("/tmp/résumé 100%.pdf"),
            "/tmp/r%C3%A9sum%C3%A9%20100%25.pdf"
        );
    }

    #[test]
    fn test_encode_uri_differs_only_by_encoding() {
        for path in ["/tmp/plain.pdf", "/tmp/报告 final.docx", "/tmp/%41.md"] {
            let encoded = encode_uri(path);
            assert_eq!(urlencoding::decode(&encoded).unwrap(), path);
        }
    }
}
