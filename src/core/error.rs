use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire launcher backend.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Failed to login: {0}")]
    LoginFailed(String),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-256 mismatch for {path:?}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Images ──────────────────────────────────────────
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Accounts ────────────────────────────────────────
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("{0}")]
    MissingCredentials(&'static str),

    // ── Instance ────────────────────────────────────────
    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("Instance already exists: {0}")]
    InstanceAlreadyExists(String),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    // ── Versions ────────────────────────────────────────
    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Client artifact missing for version {version} at {path:?}")]
    ArtifactMissing { version: String, path: PathBuf },

    // ── Launch ──────────────────────────────────────────
    #[error("Failed to start {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Another instance is already running")]
    LaunchInProgress,

    #[error("{original} (cleanup also failed: {cleanup})")]
    CleanupFailed {
        original: Box<LauncherError>,
        cleanup: Box<LauncherError>,
    },

    // ── Update ──────────────────────────────────────────
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the network rather than local state.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LauncherError::Http(_) | LauncherError::DownloadFailed { .. }
        )
    }

    /// True for the "referenced thing is absent" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LauncherError::AccountNotFound(_) | LauncherError::InstanceNotFound(_)
        )
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
