use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One entry of `instances/index.json`.
///
/// `dir` is fixed when the instance is created and never derived again, so
/// it stays valid even though it was originally built from `name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    pub dir: String,
    #[serde(rename = "ver")]
    pub version: String,
}

impl Instance {
    pub fn new(name: impl Into<String>, dir: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            version: version.into(),
        }
    }

    /// The instance's working directory under `instances_dir`.
    pub fn path_in(&self, instances_dir: &Path) -> PathBuf {
        instances_dir.join(&self.dir)
    }

    /// Custom `logo.png` shipped inside the instance directory, if any.
    pub fn logo_path_in(&self, instances_dir: &Path) -> Option<PathBuf> {
        let logo = self.path_in(instances_dir).join("logo.png");
        logo.is_file().then_some(logo)
    }
}

/// Longest directory name derived from an instance name, before any `-N` suffix.
pub const MAX_DIR_NAME_LEN: usize = 64;

/// Filesystem-safe directory name for an instance called `name`.
///
/// ASCII alphanumerics, `-` and `_` are kept, everything else becomes `_`,
/// and the result is cut to `MAX_DIR_NAME_LEN` characters.
pub fn dir_name_for(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .take(MAX_DIR_NAME_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '_') {
        "instance".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_entries_use_ver_field() {
        let instance = Instance::new("My World", "My_World", "1.3.6");
        let json = serde_json::to_value(&instance).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "My World", "dir": "My_World", "ver": "1.3.6"})
        );
    }

    #[test]
    fn dir_names_are_filesystem_safe() {
        assert_eq!(dir_name_for("Survival 1"), "Survival_1");
        assert_eq!(dir_name_for("../../etc"), "______etc");
        assert_eq!(dir_name_for("  spaced-out_ok "), "spaced-out_ok");
        assert_eq!(dir_name_for("日本"), "instance");
    }

    #[test]
    fn long_names_are_truncated() {
        let dir = dir_name_for(&"a".repeat(300));
        assert_eq!(dir.len(), MAX_DIR_NAME_LEN);
        assert_eq!(dir_name_for(&"é".repeat(300)), "instance");
    }
}
