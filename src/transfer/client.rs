//! HTTP client for the document service.
//!
//! [`TransferClient`] wraps a pooled `reqwest` client and the immutable
//! [`ClientConfig`]. It keeps no per-job state: every method issues exactly
//! one request and returns what the service sent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderName};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use super::error::TransferError;
use super::types::{Artifact, JobDescriptor, JobId, ServiceResponse, UploadSource};
use crate::config::ClientConfig;
use crate::user_agent;

/// Liveness endpoint.
pub const HEARTBEAT_PATH: &str = "/ragflowai/heartbeat";
/// Multipart upload endpoint.
pub const UPLOAD_PATH: &str = "/ragflowai/upload";
/// Status endpoint prefix; the job id is appended as the last segment.
pub const STATUS_PATH: &str = "/ragflowai/status";
/// Download endpoint prefix; the job id is appended as the last segment.
pub const DOWNLOAD_PATH: &str = "/ragflowai/download";

/// Multipart part carrying a local file.
pub const FILE_PART: &str = "file";
/// Multipart part carrying a remote URL.
pub const URL_PART: &str = "url";

/// Client for the document service.
///
/// Cheap to clone; clones share the connection pool and configuration.
///
/// # Example
///
/// ```no_run
/// use ragflow_transfer::{ClientConfig, TransferClient, UploadSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TransferClient::new(ClientConfig::from_env()?);
/// let job = client.upload(&UploadSource::local("./paper.pdf"), false).await?;
/// let status = client.get_task_status(&job.job_id).await?;
/// println!("{}", status.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TransferClient {
    client: Client,
    config: Arc<ClientConfig>,
}

impl TransferClient {
    /// Creates a client for `config`.
    ///
    /// No timeout is installed on the underlying client; see
    /// [`ClientConfig::request_timeout`].
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(config: ClientConfig) -> Self {
        let client = Client::builder()
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self::with_http_client(config, client)
    }

    /// Creates a client that reuses an existing `reqwest` client.
    #[must_use]
    pub fn with_http_client(config: ClientConfig, client: Client) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Sends the liveness probe.
    ///
    /// The reply is returned whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Network`] when the request cannot be completed.
    #[instrument(skip(self))]
    pub async fn check_heartbeat(&self) -> Result<ServiceResponse, TransferError> {
        let url = self.config.endpoint(HEARTBEAT_PATH);
        let response = self.get(&url).await?;
        into_service_response(&url, response).await
    }

    /// Submits a document for processing.
    ///
    /// With `is_remote == false` the file at the source's path is sent as the
    /// `file` part; with `is_remote == true` the source value is sent as the
    /// `url` text part. Exactly one part is sent. The flag is trusted: it is
    /// not checked against the source's own tag.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] if the local file cannot be read, the request
    /// fails, the service answers with a non-success status, or the reply
    /// carries no job id. Every error is logged before it is returned.
    #[instrument(skip(self, source), fields(remote = is_remote))]
    pub async fn upload(
        &self,
        source: &UploadSource,
        is_remote: bool,
    ) -> Result<JobDescriptor, TransferError> {
        let url = self.config.endpoint(UPLOAD_PATH);
        let result = self.upload_inner(&url, source, is_remote).await;
        match &result {
            Ok(descriptor) => info!(job_id = %descriptor.job_id, "upload accepted"),
            Err(e) => error!(url = %url, error = %e, "upload failed"),
        }
        result
    }

    /// Submits a document, taking the remote flag from the source's tag.
    ///
    /// # Errors
    ///
    /// Same as [`upload`](Self::upload).
    pub async fn upload_source(&self, source: &UploadSource) -> Result<JobDescriptor, TransferError> {
        self.upload(source, source.is_remote()).await
    }

    /// Fetches the current status of a job. One request per call; polling is
    /// up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Network`] when the request cannot be completed.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn get_task_status(&self, job_id: &JobId) -> Result<ServiceResponse, TransferError> {
        let url = self.job_url(STATUS_PATH, job_id);
        let response = self.get(&url).await?;
        into_service_response(&url, response).await
    }

    /// Absolute URL of a job's artifact, for host download primitives.
    #[must_use]
    pub fn download_url(&self, job_id: &JobId) -> String {
        self.job_url(DOWNLOAD_PATH, job_id)
    }

    /// Fetches a job's artifact into memory together with its
    /// `Content-Type` and `Content-Disposition` headers.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Network`] on transport failure and
    /// [`TransferError::HttpStatus`] on a non-success reply.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn fetch_artifact(&self, job_id: &JobId) -> Result<Artifact, TransferError> {
        let url = self.download_url(job_id);
        let response = self.get(&url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::http_status(&url, status.as_u16()));
        }

        let headers = response.headers();
        let content_type = header_string(headers, &CONTENT_TYPE);
        let disposition = header_string(headers, &CONTENT_DISPOSITION);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransferError::network(&url, e))?
            .to_vec();

        debug!(bytes = bytes.len(), content_type = ?content_type, "artifact fetched");
        Ok(Artifact {
            bytes,
            content_type,
            disposition,
        })
    }

    async fn upload_inner(
        &self,
        url: &str,
        source: &UploadSource,
        is_remote: bool,
    ) -> Result<JobDescriptor, TransferError> {
        let form = if is_remote {
            Form::new().text(URL_PART, source.value().into_owned())
        } else {
            let path = PathBuf::from(source.value().into_owned());
            Form::new().part(FILE_PART, file_part(&path).await?)
        };

        debug!(url = %url, "sending upload");
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| send_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::http_status(url, status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                TransferError::decode(url, e.to_string())
            } else {
                TransferError::network(url, e)
            }
        })?;
        JobDescriptor::from_value(body).map_err(|reason| TransferError::decode(url, reason))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, TransferError> {
        debug!(url = %url, "GET");
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| send_error(url, e))
    }

    fn job_url(&self, prefix: &str, job_id: &JobId) -> String {
        let segment = urlencoding::encode(job_id.as_str());
        self.config.endpoint(&format!("{prefix}/{segment}"))
    }
}

async fn file_part(path: &Path) -> Result<Part, TransferError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| TransferError::io(path, e))?;
    let file_name = path
        .file_name()
        .map_or_else(|| FILE_PART.to_string(), |n| n.to_string_lossy().into_owned());
    debug!(path = %path.display(), bytes = bytes.len(), "attaching upload file");
    Ok(Part::bytes(bytes).file_name(file_name))
}

/// A request the client refused to build means the URL was unusable.
fn send_error(url: &str, error: reqwest::Error) -> TransferError {
    if error.is_builder() {
        TransferError::invalid_url(url)
    } else {
        TransferError::network(url, error)
    }
}

async fn into_service_response(
    url: &str,
    response: reqwest::Response,
) -> Result<ServiceResponse, TransferError> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(|e| TransferError::network(url, e))?
        .to_vec();
    debug!(status, bytes = body.len(), "service replied");
    Ok(ServiceResponse { status, body })
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(std::string::ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> TransferClient {
        TransferClient::new(ClientConfig::new(base).unwrap())
    }

    #[test]
    fn test_download_url_under_base_path() {
        let client = client_for("http://localhost:10103/api");
        let job_id = JobId::from_service("job-1");
        assert_eq!(
            client.download_url(&job_id),
            "http://localhost:10103/api/ragflowai/download/job-1"
        );
    }

    #[test]
    fn test_job_id_is_encoded_as_single_segment() {
        let client = client_for("http://localhost:10103/api");
        let job_id = JobId::from_service("a/b c");
        assert_eq!(
            client.download_url(&job_id),
            "http://localhost:10103/api/ragflowai/download/a%2Fb%20c"
        );
    }

    #[tokio::test]
    async fn test_unusable_url_is_invalid_url_error() {
        let client = client_for("http://localhost:10103/api");
        let result = client.get("http://[::1/ragflowai/heartbeat").await;
        assert!(matches!(result, Err(TransferError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_file_part_missing_file_is_io_error() {
        let result = file_part(Path::new("/definitely/not/here.pdf")).await;
        assert!(matches!(result, Err(TransferError::Io { .. })));
    }
}
