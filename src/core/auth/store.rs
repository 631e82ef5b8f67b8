use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::storage::{load_json_or_default, save_json_atomic};

use super::model::{Account, AccountsDocument};

pub const ACCOUNTS_FILE: &str = "accounts.json";

/// Persistent account list plus the selected-account pointer.
///
/// Every mutation is a full load, in-memory change, atomic save. The document
/// is only written after the change succeeded in memory, and a failed write
/// is returned to the caller.
pub struct AccountStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AccountStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(ACCOUNTS_FILE))
    }

    pub async fn load(&self) -> LauncherResult<AccountsDocument> {
        load_json_or_default(&self.path).await
    }

    pub async fn list_accounts(&self) -> LauncherResult<Vec<Account>> {
        Ok(self.load().await?.accounts)
    }

    pub async fn add_account(&self, name: &str, password: &str) -> LauncherResult<Account> {
        if name.trim().is_empty() {
            return Err(LauncherError::InvalidName(name.to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        if doc.find(name).is_some() {
            return Err(LauncherError::AccountAlreadyExists(name.to_string()));
        }

        let account = Account::new(name, password);
        doc.accounts.push(account.clone());
        save_json_atomic(&self.path, &doc).await?;

        info!("Added account {}", name);
        Ok(account)
    }

    /// Remove an account. If it was selected (or the selection was already
    /// dangling) the first remaining account becomes selected, or none.
    ///
    /// Returns the selection after the removal.
    pub async fn remove_account(&self, name: &str) -> LauncherResult<Option<String>> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;

        let index = doc
            .accounts
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| LauncherError::AccountNotFound(name.to_string()))?;
        doc.accounts.remove(index);

        if doc.selected.is_some() && doc.selected_account().is_none() {
            doc.selected = doc.accounts.first().map(|a| a.name.clone());
        }
        save_json_atomic(&self.path, &doc).await?;

        info!(
            "Removed account {} (selected: {})",
            name,
            doc.selected.as_deref().unwrap_or("none")
        );
        Ok(doc.selected)
    }

    /// The selected account. A selection that names a missing account is
    /// treated as no selection.
    pub async fn get_selected(&self) -> LauncherResult<Option<Account>> {
        let doc = self.load().await?;
        let selected = doc.selected_account().cloned();
        if selected.is_none() {
            if let Some(dangling) = doc.selected.as_deref() {
                warn!("Selected account {} no longer exists, ignoring", dangling);
            }
        }
        Ok(selected)
    }

    pub async fn select(&self, name: &str) -> LauncherResult<Account> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let account = doc
            .find(name)
            .cloned()
            .ok_or_else(|| LauncherError::AccountNotFound(name.to_string()))?;

        doc.selected = Some(account.name.clone());
        save_json_atomic(&self.path, &doc).await?;

        info!("Selected account {}", name);
        Ok(account)
    }
}
