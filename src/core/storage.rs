// ─── Document Storage ───
// Whole-document JSON persistence shared by the account store and the
// instance registry. Writes go to a sibling temp file first and are then
// renamed over the target, so a crash mid-write never truncates the document.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{LauncherError, LauncherResult};

/// Load a JSON document, returning `T::default()` if the file doesn't exist yet.
pub async fn load_json_or_default<T>(path: &Path) -> LauncherResult<T>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read_to_string(path).await {
        Ok(raw) if raw.trim().is_empty() => Ok(T::default()),
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(source) => Err(LauncherError::io(path, source)),
    }
}

/// Serialize `value` and atomically replace `path` with it.
pub async fn save_json_atomic<T>(path: &Path, value: &T) -> LauncherResult<()>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LauncherError::io(parent, e))?;
    }

    write_atomic(path, json.as_bytes()).await?;
    debug!("Saved {:?}", path);
    Ok(())
}

/// Write `bytes` to a temp file next to `path`, then rename it into place.
///
/// The parent directory must already exist.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> LauncherResult<()> {
    let tmp = temp_sibling(path);
    if let Err(source) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(LauncherError::io(&tmp, source));
    }

    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(LauncherError::io(path, source));
    }

    Ok(())
}

/// Set the executable bits on Unix; a no-op elsewhere.
pub async fn mark_executable(path: &Path) -> LauncherResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(permissions.mode() | 0o755);
        tokio::fs::set_permissions(path, permissions)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}
