// ─── Session Patching ───
// Before a launch, the selected account's credentials are written into the
// instance's options file and any leftover multiplayer session is removed,
// so the client doesn't auto-reconnect to a previous server.

use std::path::Path;

use tracing::debug;

use crate::core::auth::Account;
use crate::core::error::LauncherResult;
use crate::core::options::OptionsFile;

pub const USERNAME_KEYS: [&str; 2] = ["launcher-cc-username", "launcher-dc-username"];
pub const PASSWORD_KEY: &str = "launcher-cc-password";

/// Keys describing a previous server session.
pub const SESSION_KEYS: [&str; 7] = [
    "launcher-session",
    "launcher-server",
    "launcher-ip",
    "launcher-port",
    "launcher-mppass",
    "launcher-dc-mppass",
    "launcher-username",
];

/// Apply `account` to an already loaded options file.
pub fn patch_options(options: &mut OptionsFile, account: &Account) {
    for key in USERNAME_KEYS {
        options.set(key, &account.name);
    }
    options.set(PASSWORD_KEY, &account.password);

    for key in SESSION_KEYS {
        options.remove(key);
    }
}

/// Inject `account` into the options file of the instance at `dir`.
pub async fn apply_account(dir: &Path, account: &Account) -> LauncherResult<()> {
    let mut options = OptionsFile::load(dir).await?;
    patch_options(&mut options, account);
    options.save(dir).await?;
    debug!("Injected credentials for {} into {:?}", account.name, dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_set_and_session_stripped() {
        let mut options = OptionsFile::parse(
            "fps=120\nlauncher-session=abc\nlauncher-server=example.org\nlauncher-ip=1.2.3.4\n\
             launcher-port=25565\nlauncher-mppass=x\nlauncher-dc-mppass=y\nlauncher-username=Old\n\
             launcher-cc-username=Old\n",
        );
        patch_options(&mut options, &Account::new("Steve", "pw1"));

        for key in SESSION_KEYS {
            assert!(options.get(key).is_none(), "{key} should be gone");
        }
        assert_eq!(options.get("launcher-cc-username"), Some("Steve"));
        assert_eq!(options.get("launcher-dc-username"), Some("Steve"));
        assert_eq!(options.get("launcher-cc-password"), Some("pw1"));
        assert_eq!(options.get("fps"), Some("120"));
    }

    #[tokio::test]
    async fn apply_account_writes_the_file() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join("options.txt"),
            "launcher-server=old.example\nviewdist=8\n",
        )
        .unwrap();

        apply_account(temp.path(), &Account::new("Alex", "secret"))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(temp.path().join("options.txt")).unwrap();
        assert!(!raw.contains("launcher-server"));
        assert!(raw.contains("viewdist=8"));
        assert!(raw.contains("launcher-cc-password=secret"));
    }
}
