// ─── Version Resolver ───
// Turns a version id into the client binary for the running platform and
// keeps a local cache of downloaded builds under `clients/`.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::RemoteApi;
use crate::core::storage::mark_executable;

use super::manifest::{Channel, Platform};

/// Where a version's client binary comes from and where it is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub version: String,
    pub platform: Platform,
    pub url: String,
    pub sha256: Option<String>,
    pub cache_path: PathBuf,
}

pub struct VersionResolver {
    remote: Arc<dyn RemoteApi>,
    downloader: Downloader,
    clients_dir: PathBuf,
    platform: Platform,
}

impl VersionResolver {
    pub fn new(remote: Arc<dyn RemoteApi>, clients_dir: PathBuf) -> Self {
        Self {
            downloader: Downloader::new(remote.clone()),
            remote,
            clients_dir,
            platform: Platform::current(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Version ids of `channel`, newest first. Always hits the network.
    pub async fn list_versions(&self, channel: Channel) -> LauncherResult<Vec<String>> {
        let manifest = self.remote.fetch_manifest().await?;
        let ids = manifest.ids(channel);
        debug!("{} {} versions available", ids.len(), channel);
        Ok(ids)
    }

    /// Locate the platform artifact for `version` in the remote manifest.
    pub async fn resolve_artifact(&self, version: &str) -> LauncherResult<ResolvedArtifact> {
        let cache_path = self.cache_path(version)?;
        let manifest = self.remote.fetch_manifest().await?;

        let download = manifest
            .find_version(version)
            .and_then(|entry| entry.downloads.get(&self.platform))
            .ok_or_else(|| LauncherError::VersionNotFound(version.to_string()))?;

        Ok(ResolvedArtifact {
            version: version.to_string(),
            platform: self.platform,
            url: download.url.clone(),
            sha256: download.sha256.clone(),
            cache_path,
        })
    }

    /// Path of the cached client binary for `version`, whether or not it exists.
    pub fn cache_path(&self, version: &str) -> LauncherResult<PathBuf> {
        if !is_safe_version_id(version) {
            return Err(LauncherError::VersionNotFound(version.to_string()));
        }
        Ok(self
            .clients_dir
            .join(format!("{version}{}", self.platform.exe_suffix())))
    }

    /// The cached binary for `version`, if it has been downloaded.
    pub async fn cached_artifact(&self, version: &str) -> LauncherResult<Option<PathBuf>> {
        let path = self.cache_path(version)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LauncherError::io(path, source)),
        }
    }

    /// Make sure the client binary for `version` is in the cache, downloading
    /// it if needed. A cached binary is used as-is without touching the network.
    pub async fn ensure_cached(&self, version: &str) -> LauncherResult<PathBuf> {
        if let Some(path) = self.cached_artifact(version).await? {
            debug!("Client {} already cached at {:?}", version, path);
            return Ok(path);
        }

        let artifact = self.resolve_artifact(version).await?;
        info!("Downloading client {} for {}", version, artifact.platform);
        self.downloader
            .download_file(&artifact.url, &artifact.cache_path, artifact.sha256.as_deref())
            .await?;
        mark_executable(&artifact.cache_path).await?;

        Ok(artifact.cache_path)
    }
}

// Version ids become file names in the cache.
fn is_safe_version_id(version: &str) -> bool {
    !version.is_empty()
        && version != "."
        && version != ".."
        && !version.contains(['/', '\\', ':', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::sha256_hex;
    use crate::core::testing::{manifest_for_current_platform, FakeRemote};
    use crate::core::version::{ArtifactDownload, VersionEntry, VersionManifest};
    use std::collections::HashMap;
    use std::path::Path;

    fn resolver(remote: FakeRemote, dir: &Path) -> (Arc<FakeRemote>, VersionResolver) {
        let remote = Arc::new(remote);
        let resolver = VersionResolver::new(remote.clone(), dir.join("clients"));
        (remote, resolver)
    }

    #[tokio::test]
    async fn lists_newest_first_and_resolves_known_versions() {
        let temp = tempfile::tempdir().unwrap();
        let manifest = manifest_for_current_platform(&["1.3.6", "1.3.5"]);
        let (_, resolver) = resolver(FakeRemote::default().with_manifest(manifest), temp.path());

        let versions = resolver.list_versions(Channel::Stable).await.unwrap();
        assert_eq!(versions, vec!["1.3.6", "1.3.5"]);
        assert!(resolver.list_versions(Channel::Dev).await.unwrap().is_empty());

        let artifact = resolver.resolve_artifact("1.3.6").await.unwrap();
        assert_eq!(artifact.url, "https://cdn.test/1.3.6");
        assert!(artifact.cache_path.starts_with(temp.path().join("clients")));

        let err = resolver.resolve_artifact("9.9.9").await.unwrap_err();
        assert!(matches!(err, LauncherError::VersionNotFound(v) if v == "9.9.9"));
    }

    #[tokio::test]
    async fn missing_platform_download_is_version_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let other = match Platform::current() {
            Platform::Windows => Platform::Linux,
            _ => Platform::Windows,
        };
        let manifest = VersionManifest {
            stable: vec![VersionEntry {
                id: "1.3.6".into(),
                downloads: HashMap::from([(
                    other,
                    ArtifactDownload {
                        url: "https://cdn.test/other".into(),
                        sha256: None,
                    },
                )]),
            }],
            dev: Vec::new(),
        };
        let (_, resolver) = resolver(FakeRemote::default().with_manifest(manifest), temp.path());

        let err = resolver.resolve_artifact("1.3.6").await.unwrap_err();
        assert!(matches!(err, LauncherError::VersionNotFound(_)));
    }

    #[tokio::test]
    async fn network_failure_surfaces_as_network_error() {
        let temp = tempfile::tempdir().unwrap();
        let (_, resolver) = resolver(FakeRemote::default(), temp.path());
        let err = resolver.list_versions(Channel::Stable).await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn ensure_cached_downloads_once() {
        let temp = tempfile::tempdir().unwrap();
        let mut manifest = manifest_for_current_platform(&["1.3.6"]);
        for download in manifest.stable[0].downloads.values_mut() {
            download.sha256 = Some(sha256_hex(b"client"));
        }
        let remote = FakeRemote::default()
            .with_manifest(manifest)
            .with_file("https://cdn.test/1.3.6", b"client");
        let (remote, resolver) = resolver(remote, temp.path());

        let path = resolver.ensure_cached("1.3.6").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"client");
        let again = resolver.ensure_cached("1.3.6").await.unwrap();
        assert_eq!(path, again);
        assert_eq!(remote.fetch_count(), 1);
    }

    #[test]
    fn path_like_versions_are_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let (_, resolver) = resolver(FakeRemote::default(), temp.path());
        assert!(resolver.cache_path("../evil").is_err());
        assert!(resolver.cache_path("..").is_err());
        assert!(resolver.cache_path("1.3.6").is_ok());
    }
}
