//! Error types for download strategies.

use thiserror::Error;

use crate::host::HostError;
use crate::transfer::TransferError;

/// Errors that abort a download pipeline.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The host download finished with a status other than 200.
    #[error("Download failed: {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// A host primitive failed.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Fetching the artifact from the service failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl StrategyError {
    /// Creates a status error.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::Status { status }
    }
}
