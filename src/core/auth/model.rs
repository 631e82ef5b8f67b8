use std::fmt;

use serde::{Deserialize, Serialize};

/// A stored account. Accounts are never edited in place; a change is a
/// remove followed by an add.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub password: String,
}

impl Account {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }
}

// Keeps passwords out of logs and panic messages.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// On-disk shape of `accounts.json`.
///
/// Credentials are stored in plaintext, exactly as the game client expects
/// them in its options file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountsDocument {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(rename = "Selected Account", default)]
    pub selected: Option<String>,
}

impl AccountsDocument {
    pub fn find(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.name == name)
    }

    /// The selected account, or `None` if nothing is selected or the
    /// selection points at an account that no longer exists.
    pub fn selected_account(&self) -> Option<&Account> {
        self.selected.as_deref().and_then(|name| self.find(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_uses_legacy_field_names() {
        let doc = AccountsDocument {
            accounts: vec![Account::new("Steve", "pw1")],
            selected: Some("Steve".into()),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["Selected Account"], "Steve");
        assert_eq!(json["accounts"][0]["name"], "Steve");
        assert_eq!(json["accounts"][0]["password"], "pw1");

        let empty: AccountsDocument =
            serde_json::from_str(r#"{"accounts": [], "Selected Account": null}"#).unwrap();
        assert_eq!(empty, AccountsDocument::default());
    }

    #[test]
    fn debug_output_hides_password() {
        let shown = format!("{:?}", Account::new("Steve", "hunter2"));
        assert!(shown.contains("Steve"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn dangling_selection_reads_as_none() {
        let doc = AccountsDocument {
            accounts: vec![Account::new("Alex", "pw")],
            selected: Some("Steve".into()),
        };
        assert!(doc.selected_account().is_none());
    }
}
