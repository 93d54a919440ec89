//! [`HostFileSystem`] for desktop operating systems.
//!
//! Ephemeral downloads land in a temp directory, persisted files are moved
//! into a caller-chosen permanent directory, and documents open in the OS
//! default viewer.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_DISPOSITION;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use super::{EphemeralFile, HostError, HostFileSystem, HostOs};
use crate::filename::{resolve_filename, resolve_unique_path, sanitize_filename};
use crate::user_agent;

/// Subdirectory of the system temp dir used for ephemeral downloads.
const TEMP_SUBDIR: &str = "ragflow-transfer";

type Opener = Arc<dyn Fn(&Path) -> io::Result<()> + Send + Sync>;

/// Desktop file-system capability.
#[derive(Clone)]
pub struct NativeFileSystem {
    client: Client,
    temp_dir: PathBuf,
    permanent_dir: PathBuf,
    os: HostOs,
    opener: Opener,
}

impl fmt::Debug for NativeFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFileSystem")
            .field("temp_dir", &self.temp_dir)
            .field("permanent_dir", &self.permanent_dir)
            .field("os", &self.os)
            .finish_non_exhaustive()
    }
}

impl NativeFileSystem {
    /// Creates an adapter persisting into `permanent_dir`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(permanent_dir: impl Into<PathBuf>) -> Self {
        let client = Client::builder()
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            temp_dir: std::env::temp_dir().join(TEMP_SUBDIR),
            permanent_dir: permanent_dir.into(),
            os: HostOs::current(),
            opener: Arc::new(|path: &Path| open::that(path)),
        }
    }

    /// Uses `temp_dir` for ephemeral downloads.
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Reports `os` instead of the compile target.
    #[must_use]
    pub fn with_os(mut self, os: HostOs) -> Self {
        self.os = os;
        self
    }

    /// Replaces the viewer launcher.
    #[must_use]
    pub fn with_opener<F>(mut self, opener: F) -> Self
    where
        F: Fn(&Path) -> io::Result<()> + Send + Sync + 'static,
    {
        self.opener = Arc::new(opener);
        self
    }

    /// Directory ephemeral downloads land in.
    #[must_use]
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Directory persisted files are moved to.
    #[must_use]
    pub fn permanent_dir(&self) -> &Path {
        &self.permanent_dir
    }
}

#[async_trait]
impl HostFileSystem for NativeFileSystem {
    #[instrument(skip(self), fields(url = %url))]
    async fn download_file(&self, url: &str) -> Result<EphemeralFile, HostError> {
        const OP: &str = "download_file";

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HostError::new(OP, e.to_string()))?;

        let status_code = response.status().as_u16();
        if status_code != 200 {
            debug!(status_code, "download finished without content");
            return Ok(EphemeralFile {
                temp_path: String::new(),
                status_code,
            });
        }

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok());
        let filename = sanitize_filename(&resolve_filename(disposition));

        tokio::fs::create_dir_all(&self.temp_dir)
            .await
            .map_err(|e| io_error(OP, &self.temp_dir, &e))?;
        let temp_path = resolve_unique_path(&self.temp_dir, &filename);
        let mut file = File::create(&temp_path)
            .await
            .map_err(|e| io_error(OP, &temp_path, &e))?;

        let stream_result = stream_to_file(&mut file, response, &temp_path).await;
        if stream_result.is_err() {
            debug!(path = %temp_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&temp_path).await;
        }
        let bytes = stream_result?;

        info!(path = %temp_path.display(), bytes, "downloaded to ephemeral storage");
        Ok(EphemeralFile {
            temp_path: temp_path.to_string_lossy().into_owned(),
            status_code,
        })
    }

    #[instrument(skip(self))]
    async fn save_file(&self, temp_path: &str) -> Result<String, HostError> {
        const OP: &str = "save_file";

        let source = existing_source_path(temp_path).await.ok_or_else(|| {
            HostError::new(OP, format!("ephemeral file {temp_path} does not exist"))
        })?;
        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| HostError::new(OP, format!("{temp_path} has no file name")))?;

        tokio::fs::create_dir_all(&self.permanent_dir)
            .await
            .map_err(|e| io_error(OP, &self.permanent_dir, &e))?;
        let target = resolve_unique_path(&self.permanent_dir, &filename);

        if let Err(rename_error) = tokio::fs::rename(&source, &target).await {
            // Temp and permanent dirs may sit on different devices.
            debug!(error = %rename_error, "rename failed, copying instead");
            tokio::fs::copy(&source, &target)
                .await
                .map_err(|e| io_error(OP, &target, &e))?;
            if let Err(e) = tokio::fs::remove_file(&source).await {
                warn!(path = %source.display(), error = %e, "could not remove ephemeral file");
            }
        }

        info!(path = %target.display(), "persisted");
        Ok(target.to_string_lossy().into_owned())
    }

    #[instrument(skip(self))]
    async fn open_document(&self, path: &str, show_menu: bool) -> Result<(), HostError> {
        const OP: &str = "open_document";

        let path = PathBuf::from(path);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(HostError::new(
                OP,
                format!("{} does not exist", path.display()),
            ));
        }

        // Desktop viewers always carry their own menus.
        debug!(show_menu, "launching default viewer");
        let opener = Arc::clone(&self.opener);
        let launch_path = path.clone();
        tokio::task::spawn_blocking(move || opener(&launch_path))
            .await
            .map_err(|e| HostError::new(OP, e.to_string()))?
            .map_err(|e| io_error(OP, &path, &e))
    }

    fn os(&self) -> HostOs {
        self.os
    }
}

/// Resolves the on-disk path for a possibly URI-encoded host path.
async fn existing_source_path(temp_path: &str) -> Option<PathBuf> {
    let raw = PathBuf::from(temp_path);
    if tokio::fs::try_exists(&raw).await.unwrap_or(false) {
        return Some(raw);
    }
    let decoded = PathBuf::from(urlencoding::decode(temp_path).ok()?.into_owned());
    tokio::fs::try_exists(&decoded)
        .await
        .unwrap_or(false)
        .then_some(decoded)
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    file_path: &Path,
) -> Result<u64, HostError> {
    const OP: &str = "download_file";

    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| HostError::new(OP, e.to_string()))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| io_error(OP, file_path, &e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| io_error(OP, file_path, &e))?;

    Ok(bytes_written)
}

fn io_error(operation: &'static str, path: &Path, error: &io::Error) -> HostError {
    HostError::new(operation, format!("{}: {error}", path.display()))
}
