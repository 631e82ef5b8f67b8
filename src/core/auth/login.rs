// ─── Account Creation ───
// Credentials are probed against the auth service before they are stored.

use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::RemoteApi;

use super::model::Account;
use super::store::AccountStore;

/// Check the credentials, store the account under the server's spelling of
/// the name, and make it the selected account.
pub async fn register_account(
    store: &AccountStore,
    remote: &dyn RemoteApi,
    username: &str,
    password: &str,
) -> LauncherResult<Account> {
    let username = username.trim();
    let password = password.trim();

    match (username.is_empty(), password.is_empty()) {
        (true, true) => return Err(LauncherError::MissingCredentials("No Username or Password")),
        (true, false) => return Err(LauncherError::MissingCredentials("No Username")),
        (false, true) => return Err(LauncherError::MissingCredentials("No Password")),
        (false, false) => {}
    }

    let response = remote.login(username, password).await?;
    if !response.authenticated {
        warn!("Login rejected for {}", username);
        return Err(LauncherError::LoginFailed(username.to_string()));
    }

    let canonical = response.username.trim();
    let canonical = if canonical.is_empty() { username } else { canonical };

    let account = store.add_account(canonical, password).await?;
    store.select(&account.name).await?;

    info!("Registered account {}", account.name);
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeRemote;

    #[tokio::test]
    async fn stores_canonical_name_and_selects_it() {
        let temp = tempfile::tempdir().unwrap();
        let store = AccountStore::in_dir(temp.path());
        let remote = FakeRemote::default().with_user("Steve", "pw1");

        let account = register_account(&store, &remote, " steve ", "pw1")
            .await
            .unwrap();
        assert_eq!(account.name, "Steve");
        assert_eq!(store.get_selected().await.unwrap(), Some(account));
    }

    #[tokio::test]
    async fn rejected_credentials_store_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let store = AccountStore::in_dir(temp.path());
        let remote = FakeRemote::default().with_user("Steve", "pw1");

        let err = register_account(&store, &remote, "Steve", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::LoginFailed(_)));
        assert!(store.list_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_fields_and_duplicates_have_distinct_errors() {
        let temp = tempfile::tempdir().unwrap();
        let store = AccountStore::in_dir(temp.path());
        let remote = FakeRemote::default().with_user("Steve", "pw1");

        let message = |r: LauncherResult<Account>| r.unwrap_err().to_string();
        assert_eq!(
            message(register_account(&store, &remote, "", "").await),
            "No Username or Password"
        );
        assert_eq!(message(register_account(&store, &remote, "", "pw").await), "No Username");
        assert_eq!(message(register_account(&store, &remote, "Steve", " ").await), "No Password");

        register_account(&store, &remote, "Steve", "pw1").await.unwrap();
        let err = register_account(&store, &remote, "STEVE", "pw1")
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::AccountAlreadyExists(name) if name == "Steve"));
    }
}
