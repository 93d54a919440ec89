//! Capabilities the host runtime lends to the download strategies.
//!
//! The core never touches a browser document, a mini-app file API or a native
//! file manager directly. It talks to these traits instead, and the embedding
//! runtime supplies implementations:
//!
//! - [`HostFileSystem`] - download to ephemeral storage, persist, open in a viewer
//! - [`BrowserDocument`] - in-memory reference URLs and save-as anchors
//! - [`Notifier`] - transient toasts
//!
//! [`native::NativeFileSystem`] is a ready-made [`HostFileSystem`] for desktop
//! operating systems.

mod error;
pub mod native;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

pub use error::HostError;

/// Operating system the host reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    /// iOS; ephemeral paths must be URI-encoded before they are persisted.
    Ios,
    /// Android.
    Android,
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
    /// Linux and other desktop Unixes.
    Linux,
    /// Anything else.
    Other,
}

impl HostOs {
    /// Maps an OS name (`std::env::consts::OS` style, case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "ios" => Self::Ios,
            "android" => Self::Android,
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            "linux" | "freebsd" | "openbsd" | "netbsd" => Self::Linux,
            _ => Self::Other,
        }
    }

    /// The OS this crate was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }
}

/// Result of a host download into ephemeral storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralFile {
    /// Host path of the downloaded file.
    pub temp_path: String,
    /// HTTP status the download finished with.
    pub status_code: u16,
}

/// File-system primitives of an installed or sandboxed app runtime.
#[async_trait]
pub trait HostFileSystem: Send + Sync {
    /// Downloads `url` into ephemeral storage.
    ///
    /// A reply with any status is reported through
    /// [`EphemeralFile::status_code`]; only transport failures are errors.
    async fn download_file(&self, url: &str) -> Result<EphemeralFile, HostError>;

    /// Moves an ephemeral file into permanent storage, returning the new path.
    async fn save_file(&self, temp_path: &str) -> Result<String, HostError>;

    /// Opens a file in the document viewer.
    async fn open_document(&self, path: &str, show_menu: bool) -> Result<(), HostError>;

    /// Operating system of the host.
    fn os(&self) -> HostOs;
}

/// Bytes plus a MIME type, ready to become a reference URL.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    /// Content.
    pub bytes: Vec<u8>,
    /// MIME type; empty when the service sent none.
    pub mime_type: String,
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Short-lived URL that lets the page treat in-memory bytes as a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceUrl(pub String);

impl fmt::Display for ReferenceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to an anchor element attached to the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorHandle(pub u64);

/// Browser page primitives used by the save-as flow.
pub trait BrowserDocument: Send + Sync {
    /// Registers `blob` and returns a reference URL for it.
    fn create_reference_url(&self, blob: Blob) -> Result<ReferenceUrl, HostError>;

    /// Releases a reference URL.
    fn revoke_reference_url(&self, url: &ReferenceUrl);

    /// Creates an anchor with `href` and `download = filename` and appends it to the body.
    fn attach_download_anchor(&self, href: &str, filename: &str) -> Result<AnchorHandle, HostError>;

    /// Clicks an attached anchor.
    fn click_anchor(&self, anchor: AnchorHandle) -> Result<(), HostError>;

    /// Removes an anchor from the document.
    fn detach_anchor(&self, anchor: AnchorHandle);
}

/// Toast icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastIcon {
    /// Success check mark.
    Success,
    /// Text only.
    None,
}

/// Transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Text shown.
    pub title: String,
    /// Icon shown next to it.
    pub icon: ToastIcon,
    /// How long it stays.
    pub duration: Duration,
}

/// Transient notifications shown by the host UI.
pub trait Notifier: Send + Sync {
    /// Shows `toast`. Fire and forget.
    fn show_toast(&self, toast: Toast);
}
