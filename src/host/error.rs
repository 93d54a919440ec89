//! Errors reported by host capabilities.

use thiserror::Error;

/// A host primitive (download, persist, open, DOM call) failed.
#[derive(Debug, Clone, Error)]
#[error("host {operation} failed: {cause}")]
pub struct HostError {
    /// Primitive that failed, e.g. `download_file`.
    pub operation: &'static str,
    /// Host-supplied description.
    pub cause: String,
}

impl HostError {
    /// Creates a host error.
    pub fn new(operation: &'static str, cause: impl Into<String>) -> Self {
        Self {
            operation,
            cause: cause.into(),
        }
    }
}
