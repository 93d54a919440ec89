//! Shared fakes for integration tests: recording host capabilities and a
//! tracing setup that honors `RUST_LOG`.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ragflow_transfer::host::{
    AnchorHandle, Blob, BrowserDocument, EphemeralFile, HostError, HostFileSystem, HostOs,
    Notifier, ReferenceUrl, Toast,
};
use ragflow_transfer::{ClientConfig, TransferClient};
use wiremock::MockServer;

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Client pointed at `server` under an `/api` prefix.
pub fn client_for(server: &MockServer) -> TransferClient {
    let config = ClientConfig::new(&format!("{}/api", server.uri())).expect("valid mock URI");
    TransferClient::new(config)
}

/// Client pointed at an address nothing listens on.
pub fn unreachable_client() -> TransferClient {
    TransferClient::new(ClientConfig::new("http://127.0.0.1:1/api").expect("valid URI"))
}

// ==================== Browser ====================

#[derive(Debug, Default)]
pub struct DocumentState {
    next_id: u64,
    pub created: Vec<(ReferenceUrl, Blob)>,
    pub revoked: Vec<ReferenceUrl>,
    pub anchors: Vec<(AnchorHandle, String, String)>,
    pub attached: BTreeSet<u64>,
    pub clicked: Vec<AnchorHandle>,
}

/// Browser document that records every DOM call.
#[derive(Debug, Default)]
pub struct RecordingDocument {
    pub state: Mutex<DocumentState>,
    pub fail_click: bool,
    pub fail_create: bool,
}

impl RecordingDocument {
    pub fn failing_click() -> Self {
        Self {
            fail_click: true,
            ..Self::default()
        }
    }

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn snapshot<R>(&self, f: impl FnOnce(&DocumentState) -> R) -> R {
        f(&self.state.lock().expect("document state lock"))
    }
}

impl BrowserDocument for RecordingDocument {
    fn create_reference_url(&self, blob: Blob) -> Result<ReferenceUrl, HostError> {
        if self.fail_create {
            return Err(HostError::new("create_reference_url", "blob rejected"));
        }
        let mut state = self.state.lock().expect("document state lock");
        state.next_id += 1;
        let url = ReferenceUrl(format!("blob:http://localhost/{}", state.next_id));
        state.created.push((url.clone(), blob));
        Ok(url)
    }

    fn revoke_reference_url(&self, url: &ReferenceUrl) {
        self.state
            .lock()
            .expect("document state lock")
            .revoked
            .push(url.clone());
    }

    fn attach_download_anchor(&self, href: &str, filename: &str) -> Result<AnchorHandle, HostError> {
        let mut state = self.state.lock().expect("document state lock");
        state.next_id += 1;
        let anchor = AnchorHandle(state.next_id);
        state
            .anchors
            .push((anchor, href.to_string(), filename.to_string()));
        state.attached.insert(anchor.0);
        Ok(anchor)
    }

    fn click_anchor(&self, anchor: AnchorHandle) -> Result<(), HostError> {
        if self.fail_click {
            return Err(HostError::new("click_anchor", "click blocked"));
        }
        self.state
            .lock()
            .expect("document state lock")
            .clicked
            .push(anchor);
        Ok(())
    }

    fn detach_anchor(&self, anchor: AnchorHandle) {
        self.state
            .lock()
            .expect("document state lock")
            .attached
            .remove(&anchor.0);
    }
}

/// Notifier that keeps every toast.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().expect("toast lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_toast(&self, toast: Toast) {
        self.toasts.lock().expect("toast lock").push(toast);
    }
}

// ==================== App file system ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCall {
    Download(String),
    Save(String),
    Open(String, bool),
}

/// App file system with scripted replies.
#[derive(Debug)]
pub struct FakeFileSystem {
    pub os: HostOs,
    pub download: Result<EphemeralFile, HostError>,
    pub save: Result<String, HostError>,
    pub open: Result<(), HostError>,
    pub calls: Mutex<Vec<FsCall>>,
}

impl FakeFileSystem {
    /// Every phase succeeds: downloads land at `temp_path`, saves at `saved_path`.
    pub fn succeeding(os: HostOs, temp_path: &str, saved_path: &str) -> Self {
        Self {
            os,
            download: Ok(EphemeralFile {
                temp_path: temp_path.to_string(),
                status_code: 200,
            }),
            save: Ok(saved_path.to_string()),
            open: Ok(()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_download_status(mut self, status_code: u16) -> Self {
        if let Ok(file) = &mut self.download {
            file.status_code = status_code;
        }
        self
    }

    pub fn with_download_error(mut self, error: HostError) -> Self {
        self.download = Err(error);
        self
    }

    pub fn with_save_error(mut self, error: HostError) -> Self {
        self.save = Err(error);
        self
    }

    pub fn with_open_error(mut self, error: HostError) -> Self {
        self.open = Err(error);
        self
    }

    pub fn calls(&self) -> Vec<FsCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: FsCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl HostFileSystem for FakeFileSystem {
    async fn download_file(&self, url: &str) -> Result<EphemeralFile, HostError> {
        self.record(FsCall::Download(url.to_string()));
        self.download.clone()
    }

    async fn save_file(&self, temp_path: &str) -> Result<String, HostError> {
        self.record(FsCall::Save(temp_path.to_string()));
        self.save.clone()
    }

    async fn open_document(&self, path: &str, show_menu: bool) -> Result<(), HostError> {
        self.record(FsCall::Open(path.to_string(), show_menu));
        self.open.clone()
    }

    fn os(&self) -> HostOs {
        self.os
    }
}

// ==================== Native opener ====================

/// Collects paths handed to the viewer launcher instead of launching anything.
#[derive(Debug, Clone, Default)]
pub struct OpenedPaths(pub Arc<Mutex<Vec<PathBuf>>>);

impl OpenedPaths {
    pub fn opener(&self) -> impl Fn(&Path) -> std::io::Result<()> + Send + Sync + 'static {
        let opened = Arc::clone(&self.0);
        move |path: &Path| {
            opened
                .lock()
                .expect("opened lock")
                .push(path.to_path_buf());
            Ok(())
        }
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.0.lock().expect("opened lock").clone()
    }
}
