//! Values exchanged with the document service.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Keys the service has used for the job identifier, in lookup order.
const JOB_ID_KEYS: [&str; 5] = ["job_id", "task_id", "taskId", "jobId", "id"];

/// Opaque job identifier issued by the service.
///
/// Obtained from an upload reply; never constructed from scratch by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wraps an identifier the caller received from the service by other means
    /// (for example a job listed in an earlier session).
    pub fn from_service(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as sent by the service.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("job id must be a non-empty string or number"))
    }
}

/// What to submit for processing.
///
/// Deserializes from `{"kind": "local", "path": ...}` (the path may also be
/// named `tempFilePath` or `filePath`) or `{"kind": "remote", "url": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UploadSource {
    /// A file on the local file system.
    Local {
        /// Path of the file to upload.
        #[serde(alias = "tempFilePath", alias = "filePath")]
        path: PathBuf,
    },
    /// A document the service fetches itself.
    Remote {
        /// URL of the document.
        url: String,
    },
}

impl UploadSource {
    /// Local file source.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    /// Remote URL source.
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote { url: url.into() }
    }

    /// Whether the tag says remote.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// The path or URL, whichever this source carries.
    #[must_use]
    pub fn value(&self) -> Cow<'_, str> {
        match self {
            Self::Local { path } => path.to_string_lossy(),
            Self::Remote { url } => Cow::Borrowed(url),
        }
    }
}

/// Service reply to an upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDescriptor {
    /// The job to poll and download.
    pub job_id: JobId,
    /// Every other field of the reply, verbatim.
    pub fields: Map<String, Value>,
}

impl JobDescriptor {
    /// Builds a descriptor from a decoded reply body.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the body is not an object or
    /// carries no usable job id.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(mut fields) = value else {
            return Err("expected a JSON object".to_string());
        };
        let key = JOB_ID_KEYS
            .iter()
            .find(|key| fields.get(**key).and_then(JobId::from_value).is_some())
            .ok_or_else(|| format!("no job id under any of {JOB_ID_KEYS:?}"))?;
        let job_id = fields
            .remove(*key)
            .as_ref()
            .and_then(JobId::from_value)
            .ok_or_else(|| format!("no job id under any of {JOB_ID_KEYS:?}"))?;
        Ok(Self { job_id, fields })
    }
}

/// Raw service reply, returned as-is for heartbeat and status polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reply body.
    pub body: Vec<u8>,
}

impl ServiceResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body as text, lossily decoded.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// A finished artifact fetched into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Artifact bytes.
    pub bytes: Vec<u8>,
    /// `Content-Type` of the reply, if sent.
    pub content_type: Option<String>,
    /// `Content-Disposition` of the reply, if sent.
    pub disposition: Option<String>,
}
