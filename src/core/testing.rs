// In-memory stand-in for the network, used by unit tests across the crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::{LoginResponse, RemoteApi};
use crate::core::version::{ArtifactDownload, Platform, VersionEntry, VersionManifest};

/// Serializes tests that write an executable and then run it. A fork from a
/// parallel test while the file is still open for writing makes exec fail
/// with ETXTBSY.
pub static SPAWN_LOCK: Mutex<()> = Mutex::new(());

#[derive(Default)]
pub struct FakeRemote {
    pub manifest: Option<VersionManifest>,
    /// lowercase username -> (canonical username, password)
    pub users: HashMap<String, (String, String)>,
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    pub fetches: AtomicUsize,
}

impl FakeRemote {
    pub fn with_manifest(mut self, manifest: VersionManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn with_user(mut self, name: &str, password: &str) -> Self {
        self.users
            .insert(name.to_lowercase(), (name.to_string(), password.to_string()));
        self
    }

    pub fn with_file(self, url: &str, bytes: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn fetch_manifest(&self) -> LauncherResult<VersionManifest> {
        self.manifest.clone().ok_or(LauncherError::DownloadFailed {
            url: "manifest".into(),
            status: 503,
        })
    }

    async fn login(&self, username: &str, password: &str) -> LauncherResult<LoginResponse> {
        match self.users.get(&username.to_lowercase()) {
            Some((canonical, expected)) if expected == password => Ok(LoginResponse {
                authenticated: true,
                username: canonical.clone(),
            }),
            _ => Ok(LoginResponse {
                authenticated: false,
                username: username.to_string(),
            }),
        }
    }

    async fn fetch_bytes(&self, url: &str) -> LauncherResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// A manifest listing `ids` in the stable channel, each downloadable for the
/// current platform from `https://cdn.test/<id>`.
pub fn manifest_for_current_platform(ids: &[&str]) -> VersionManifest {
    VersionManifest {
        stable: ids
            .iter()
            .map(|id| VersionEntry {
                id: id.to_string(),
                downloads: HashMap::from([(
                    Platform::current(),
                    ArtifactDownload {
                        url: format!("https://cdn.test/{id}"),
                        sha256: None,
                    },
                )]),
            })
            .collect(),
        dev: Vec::new(),
    }
}
