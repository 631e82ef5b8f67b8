use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::RemoteApi;
use crate::core::storage::write_atomic;

/// SHA-256 validated single-file downloader.
#[derive(Clone)]
pub struct Downloader {
    remote: Arc<dyn RemoteApi>,
}

impl Downloader {
    pub fn new(remote: Arc<dyn RemoteApi>) -> Self {
        Self { remote }
    }

    /// Download a single file to `dest`, optionally validating SHA-256.
    ///
    /// Creates parent directories as needed. The hash is checked on the
    /// in-memory buffer, so a mismatching download never reaches `dest`.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha256_expected: Option<&str>,
    ) -> LauncherResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let bytes = self.remote.fetch_bytes(url).await?;

        if let Some(expected) = sha256_expected {
            verify_sha256(dest, &bytes, expected)?;
        }

        write_atomic(dest, &bytes).await?;

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Check `bytes` against an expected hex digest; `path` is only used for the error.
pub fn verify_sha256(path: &Path, bytes: &[u8], expected: &str) -> LauncherResult<()> {
    let actual = sha256_hex(bytes);
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(LauncherError::IntegrityMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeRemote;

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn mismatching_download_is_not_written() {
        let temp = tempfile::tempdir().unwrap();
        let remote = FakeRemote::default().with_file("https://x/a", b"payload");
        let downloader = Downloader::new(Arc::new(remote));
        let dest = temp.path().join("sub").join("a");

        let err = downloader
            .download_file("https://x/a", &dest, Some("00"))
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::IntegrityMismatch { .. }));
        assert!(!dest.exists());

        let digest = sha256_hex(b"payload");
        downloader
            .download_file("https://x/a", &dest, Some(&digest))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    }
}
