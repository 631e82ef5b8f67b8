// ─── Self Update ───
// Downloads the installer bootstrap, runs it to refresh the installation in
// place, then replaces the running launcher with a fresh process.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::{error, info, warn};

use crate::core::downloader::verify_sha256;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::RemoteApi;
use crate::core::storage::{mark_executable, write_atomic};
use crate::core::version::Platform;

pub const BOOTSTRAP_STEM: &str = "installer_backend";

#[derive(Debug, Clone)]
pub struct UpdateSource {
    pub url: String,
    /// Expected SHA-256 of the bootstrap. Without it the download is run unverified.
    pub sha256: Option<String>,
}

pub struct SelfUpdater {
    remote: Arc<dyn RemoteApi>,
    source: UpdateSource,
    work_dir: PathBuf,
    platform: Platform,
}

impl SelfUpdater {
    pub fn new(remote: Arc<dyn RemoteApi>, source: UpdateSource, work_dir: PathBuf) -> Self {
        Self {
            remote,
            source,
            work_dir,
            platform: Platform::current(),
        }
    }

    pub fn bootstrap_path(&self) -> PathBuf {
        self.work_dir
            .join(format!("{BOOTSTRAP_STEM}{}", self.platform.exe_suffix()))
    }

    /// Fetch and run the bootstrap, removing it afterwards.
    ///
    /// Nothing is executed unless the whole download arrived (and matched the
    /// configured digest), so a failed fetch leaves the installation as it was.
    pub async fn install(&self) -> LauncherResult<()> {
        info!("Fetching updater from {}", self.source.url);
        let bytes = self.remote.fetch_bytes(&self.source.url).await?;
        let path = self.bootstrap_path();

        match self.source.sha256.as_deref() {
            Some(expected) => verify_sha256(&path, &bytes, expected)?,
            None => warn!("No updater checksum configured, running it unverified"),
        }

        write_atomic(&path, &bytes).await?;
        let result = self.run_bootstrap(&path).await;
        let cleanup = match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LauncherError::io(&path, source)),
        };

        match (result, cleanup) {
            (Ok(()), Ok(())) => {
                info!("Update installed");
                Ok(())
            }
            (Ok(()), Err(cleanup)) => Err(cleanup),
            (Err(original), Ok(())) => Err(original),
            (Err(original), Err(cleanup)) => {
                error!("Removing the updater also failed: {}", cleanup);
                Err(LauncherError::CleanupFailed {
                    original: Box::new(original),
                    cleanup: Box::new(cleanup),
                })
            }
        }
    }

    /// Install the update, then hand over to a fresh launcher process.
    /// Only returns on failure.
    pub async fn update_and_restart(&self) -> LauncherResult<Infallible> {
        self.install().await?;
        restart()
    }

    async fn run_bootstrap(&self, path: &Path) -> LauncherResult<()> {
        mark_executable(path).await?;
        let program = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| LauncherError::io(path, e))?;

        let status = Command::new(&program)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| LauncherError::Spawn {
                path: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(LauncherError::UpdateFailed(format!(
                "updater exited with {status}"
            )));
        }
        Ok(())
    }
}

/// Start a new copy of this launcher with the same arguments and exit.
///
/// This is the last thing the process does; the successor starts from disk
/// with no shared state.
pub fn restart() -> LauncherResult<Infallible> {
    let exe = std::env::current_exe().map_err(|e| LauncherError::io("current_exe", e))?;
    let args: Vec<_> = std::env::args_os().skip(1).collect();

    std::process::Command::new(&exe)
        .args(&args)
        .spawn()
        .map_err(|source| LauncherError::Spawn {
            path: exe.clone(),
            source,
        })?;

    info!("Restarting into {:?}", exe);
    std::process::exit(0)
}
