use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::auth::{AccountStore, SkinSource};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::{build_http_client, Endpoints, HttpRemote, RemoteApi, APP_USER_AGENT};
use crate::core::instance::InstanceRegistry;
use crate::core::launch::LaunchOrchestrator;
use crate::core::storage::save_json_atomic;
use crate::core::update::{SelfUpdater, UpdateSource};
use crate::core::version::VersionResolver;

const APP_DIR_NAME: &str = "LaunchiCube";
const DATA_DIR_ENV: &str = "LAUNCHICUBE_DATA_DIR";
const SETTINGS_FILE: &str = "launcher_settings.json";
const REPO_RAW_BASE: &str = "https://raw.githubusercontent.com/Tycho10101/LaunchiCube/refs/heads/main/";

/// Remote endpoints and other knobs, persisted as `launcher_settings.json`.
/// Any field missing from the file takes its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LauncherSettings {
    pub manifest_url: String,
    pub login_url: String,
    pub skin_url_base: String,
    pub default_skin_url: String,
    pub update_url: String,
    pub update_sha256: Option<String>,
    pub user_agent: String,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            manifest_url: format!("{REPO_RAW_BASE}misc/versions.json"),
            login_url: "https://www.classicube.net/api/login/".into(),
            skin_url_base: "https://cdn.classicube.net/skin".into(),
            default_skin_url: "https://Tycho10101.is-a.dev/Assets/char.png".into(),
            update_url: format!("{REPO_RAW_BASE}misc/installer_backend"),
            update_sha256: None,
            user_agent: APP_USER_AGENT.into(),
        }
    }
}

impl LauncherSettings {
    /// Load settings from `data_dir`, falling back to defaults if the file is
    /// missing or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("Cannot read {:?}: {}, using defaults", path, e);
                return Self::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Corrupt {:?}: {}, using defaults", path, e);
            Self::default()
        })
    }

    pub async fn save(&self, data_dir: &Path) -> LauncherResult<()> {
        save_json_atomic(&data_dir.join(SETTINGS_FILE), self).await
    }
}

/// Everything the launcher core needs, wired to one data directory.
pub struct AppState {
    pub data_dir: PathBuf,
    pub settings: LauncherSettings,
    pub remote: Arc<dyn RemoteApi>,
    pub accounts: AccountStore,
    pub instances: InstanceRegistry,
    pub versions: VersionResolver,
    pub launcher: LaunchOrchestrator,
    pub skins: SkinSource,
}

impl AppState {
    /// Build the state for `data_dir` talking to the real services.
    pub fn new(data_dir: PathBuf) -> LauncherResult<Self> {
        std::fs::create_dir_all(&data_dir).map_err(|e| LauncherError::io(&data_dir, e))?;
        let settings = LauncherSettings::load(&data_dir);

        let client = build_http_client(&settings.user_agent)?;
        let remote = HttpRemote::new(
            client,
            Endpoints {
                manifest_url: settings.manifest_url.clone(),
                login_url: settings.login_url.clone(),
            },
        );

        Ok(Self::with_remote(data_dir, settings, Arc::new(remote)))
    }

    pub fn with_remote(
        data_dir: PathBuf,
        settings: LauncherSettings,
        remote: Arc<dyn RemoteApi>,
    ) -> Self {
        debug!("Data directory: {:?}", data_dir);
        let instances_dir = data_dir.join("instances");
        let skins = SkinSource {
            skin_url_base: settings.skin_url_base.clone(),
            default_skin_url: settings.default_skin_url.clone(),
        };

        Self {
            accounts: AccountStore::in_dir(&data_dir),
            instances: InstanceRegistry::new(instances_dir.clone()),
            versions: VersionResolver::new(remote.clone(), data_dir.join("clients")),
            launcher: LaunchOrchestrator::new(instances_dir),
            skins,
            remote,
            settings,
            data_dir,
        }
    }

    /// Updater that drops its bootstrap into `work_dir`.
    pub fn updater(&self, work_dir: PathBuf) -> SelfUpdater {
        SelfUpdater::new(
            self.remote.clone(),
            UpdateSource {
                url: self.settings.update_url.clone(),
                sha256: self.settings.update_sha256.clone(),
            },
            work_dir,
        )
    }

    pub fn instances_dir(&self) -> &Path {
        self.instances.instances_dir()
    }
}

/// `$LAUNCHICUBE_DATA_DIR`, else the platform data dir plus `LaunchiCube`.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
