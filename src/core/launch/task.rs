// ─── Launch Task ───
// Copies the instance's pinned client into its directory, runs it there and
// waits for it to exit, then removes the copy again on every path.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::{DateTime, Utc};
use tokio::process::Command;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::core::auth::Account;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::Instance;
use crate::core::storage::mark_executable;
use crate::core::version::{Platform, VersionResolver};

use super::session::apply_account;

pub const CLIENT_EXE_STEM: &str = "ClassiCube";

/// Where a launch currently is. `Idle` both before and after a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPhase {
    Idle,
    Preparing,
    Running,
    Cleaning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// `None` when the client was killed by a signal.
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl LaunchOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// File name of the client copy placed inside an instance directory.
pub fn client_exe_name(platform: Platform) -> String {
    format!("{CLIENT_EXE_STEM}{}", platform.exe_suffix())
}

/// Runs one instance at a time.
pub struct LaunchOrchestrator {
    instances_dir: PathBuf,
    running: Mutex<()>,
    phase: watch::Sender<LaunchPhase>,
}

impl LaunchOrchestrator {
    pub fn new(instances_dir: PathBuf) -> Self {
        let (phase, _) = watch::channel(LaunchPhase::Idle);
        Self {
            instances_dir,
            running: Mutex::new(()),
            phase,
        }
    }

    pub fn phase(&self) -> LaunchPhase {
        *self.phase.borrow()
    }

    /// Follow phase changes, e.g. to disable a "Play" button while running.
    pub fn subscribe(&self) -> watch::Receiver<LaunchPhase> {
        self.phase.subscribe()
    }

    /// Launch `instance` and wait for the client to exit.
    ///
    /// A non-zero exit code is reported in the outcome, not as an error. The
    /// copied client is removed afterwards whatever happened; if that removal
    /// fails after an earlier error, both are returned in `CleanupFailed`.
    pub async fn launch(
        &self,
        resolver: &VersionResolver,
        instance: &Instance,
        account: Option<&Account>,
    ) -> LauncherResult<LaunchOutcome> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| LauncherError::LaunchInProgress)?;

        info!("Starting game for: {}", instance.name);
        let dir = instance.path_in(&self.instances_dir);
        let exe = dir.join(client_exe_name(resolver.platform()));

        self.phase.send_replace(LaunchPhase::Preparing);
        let result = self.prepare_and_run(resolver, instance, account, &dir, &exe).await;

        self.phase.send_replace(LaunchPhase::Cleaning);
        let cleanup = remove_client_copy(&exe).await;
        self.phase.send_replace(LaunchPhase::Idle);

        match (result, cleanup) {
            (Ok(outcome), Ok(())) => {
                info!(
                    "'{}' exited with {:?} after {}s",
                    instance.name,
                    outcome.exit_code,
                    (outcome.finished_at - outcome.started_at).num_seconds()
                );
                Ok(outcome)
            }
            (Ok(_), Err(cleanup)) => Err(cleanup),
            (Err(original), Ok(())) => Err(original),
            (Err(original), Err(cleanup)) => {
                error!("Cleanup after failed launch also failed: {}", cleanup);
                Err(LauncherError::CleanupFailed {
                    original: Box::new(original),
                    cleanup: Box::new(cleanup),
                })
            }
        }
    }

    async fn prepare_and_run(
        &self,
        resolver: &VersionResolver,
        instance: &Instance,
        account: Option<&Account>,
        dir: &Path,
        exe: &Path,
    ) -> LauncherResult<LaunchOutcome> {
        let metadata = match tokio::fs::metadata(dir).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LauncherError::InstanceNotFound(instance.name.clone()));
            }
            Err(source) => return Err(LauncherError::io(dir, source)),
        };
        if !metadata.is_dir() {
            return Err(LauncherError::InstanceNotFound(instance.name.clone()));
        }

        let artifact = locate_artifact(resolver, &instance.version).await?;

        match account {
            Some(account) => apply_account(dir, account).await?,
            None => debug!("No account selected, leaving options untouched"),
        }

        tokio::fs::copy(&artifact, exe)
            .await
            .map_err(|e| LauncherError::io(exe, e))?;
        mark_executable(exe).await?;
        let exe = tokio::fs::canonicalize(exe)
            .await
            .map_err(|e| LauncherError::io(exe, e))?;

        let mut cmd = Command::new(&exe);
        cmd.current_dir(dir);
        cmd.stdin(Stdio::null());
        debug!("Command: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|source| LauncherError::Spawn {
            path: exe.clone(),
            source,
        })?;
        let started_at = Utc::now();
        self.phase.send_replace(LaunchPhase::Running);

        let status = child
            .wait()
            .await
            .map_err(|source| LauncherError::io(&exe, source))?;

        Ok(LaunchOutcome {
            exit_code: status.code(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// The cached client for `version`, downloading it if the cache is empty.
async fn locate_artifact(resolver: &VersionResolver, version: &str) -> LauncherResult<PathBuf> {
    if let Some(path) = resolver.cached_artifact(version).await? {
        return Ok(path);
    }

    warn!("Client {} not cached, fetching it", version);
    match resolver.ensure_cached(version).await {
        Ok(path) => Ok(path),
        Err(LauncherError::VersionNotFound(_)) => Err(LauncherError::ArtifactMissing {
            version: version.to_string(),
            path: resolver.cache_path(version).unwrap_or_default(),
        }),
        Err(e) => Err(e),
    }
}

async fn remove_client_copy(exe: &Path) -> LauncherResult<()> {
    match tokio::fs::remove_file(exe).await {
        Ok(()) => {
            debug!("Removed {:?}", exe);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LauncherError::io(exe, source)),
    }
}
