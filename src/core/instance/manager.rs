use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::model::{dir_name_for, Instance};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::options::OPTIONS_FILE;
use crate::core::storage::{load_json_or_default, save_json_atomic};
use crate::core::version::VersionResolver;

pub const INDEX_FILE: &str = "index.json";

/// Ordered, persisted list of instances plus their directories on disk.
///
/// Ordering rules keep the index trustworthy across crashes: on create the
/// directory is made before the index entry, on delete it is removed before
/// the entry. The worst leftover is an orphaned directory.
pub struct InstanceRegistry {
    /// Root directory where all instances live.
    instances_dir: PathBuf,
    index_path: PathBuf,
    write_lock: Mutex<()>,
}

impl InstanceRegistry {
    pub fn new(instances_dir: PathBuf) -> Self {
        Self {
            index_path: instances_dir.join(INDEX_FILE),
            instances_dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn instances_dir(&self) -> &Path {
        &self.instances_dir
    }

    pub fn instance_dir(&self, instance: &Instance) -> PathBuf {
        instance.path_in(&self.instances_dir)
    }

    /// All instances in creation order.
    pub async fn list(&self) -> LauncherResult<Vec<Instance>> {
        load_json_or_default(&self.index_path).await
    }

    pub async fn get(&self, name: &str) -> LauncherResult<Instance> {
        self.list()
            .await?
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| LauncherError::InstanceNotFound(name.to_string()))
    }

    /// Create a new instance pinned to `version`.
    ///
    /// The version is validated and its client downloaded into the cache
    /// before anything is written, so an unknown version leaves no trace.
    pub async fn create(
        &self,
        resolver: &VersionResolver,
        name: &str,
        version: &str,
    ) -> LauncherResult<Instance> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LauncherError::InvalidName(name.to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let mut instances = self.list().await?;
        if instances.iter().any(|i| i.name == name) {
            return Err(LauncherError::InstanceAlreadyExists(name.to_string()));
        }

        resolver.ensure_cached(version).await?;

        let dir = self.unique_dir_name(name, &instances).await?;
        let instance = Instance::new(name, dir, version);
        self.materialize(&instance).await?;

        instances.push(instance.clone());
        save_json_atomic(&self.index_path, &instances).await?;

        info!(
            "Created instance '{}' ({}) on {}",
            instance.name, instance.dir, instance.version
        );
        Ok(instance)
    }

    /// Delete an instance's directory, then its index entry.
    ///
    /// A directory that is already gone does not block removing the entry.
    pub async fn delete(&self, instance: &Instance) -> LauncherResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut instances = self.list().await?;
        let index = instances
            .iter()
            .position(|i| i.name == instance.name && i.dir == instance.dir)
            .ok_or_else(|| LauncherError::InstanceNotFound(instance.name.clone()))?;

        let dir = self.instance_dir(&instances[index]);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Instance directory {:?} was already gone", dir);
            }
            Err(source) => return Err(LauncherError::io(dir, source)),
        }

        instances.remove(index);
        save_json_atomic(&self.index_path, &instances).await?;

        info!("Deleted instance '{}'", instance.name);
        Ok(())
    }

    async fn materialize(&self, instance: &Instance) -> LauncherResult<()> {
        let dir = self.instance_dir(instance);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| LauncherError::io(&dir, e))?;

        let options = dir.join(OPTIONS_FILE);
        match tokio::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&options)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(source) => Err(LauncherError::io(options, source)),
        }
    }

    // Skips names used by the index and directories left behind on disk.
    async fn unique_dir_name(&self, name: &str, instances: &[Instance]) -> LauncherResult<String> {
        let taken: HashSet<&str> = instances.iter().map(|i| i.dir.as_str()).collect();
        let base = dir_name_for(name);
        let mut candidate = base.clone();
        let mut n = 2;
        loop {
            let path = self.instances_dir.join(&candidate);
            let on_disk = tokio::fs::try_exists(&path)
                .await
                .map_err(|e| LauncherError::io(&path, e))?;
            if candidate != INDEX_FILE && !taken.contains(candidate.as_str()) && !on_disk {
                return Ok(candidate);
            }
            candidate = format!("{base}-{n}");
            n += 1;
        }
    }
}
