// ─── Version Manifest ───
// Remote list of client builds per release channel, newest first, with a
// download per platform.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Release track used to filter the list of available versions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Stable,
    Dev,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Stable => write!(f, "stable"),
            Channel::Dev => write!(f, "dev"),
        }
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(Channel::Stable),
            "dev" => Ok(Channel::Dev),
            other => Err(format!("unknown channel {other:?} (expected stable or dev)")),
        }
    }
}

/// Platforms the client is published for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Macos,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Macos
        } else {
            Platform::Linux
        }
    }

    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Linux | Platform::Macos => "",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::Linux => write!(f, "linux"),
            Platform::Macos => write!(f, "macos"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactDownload {
    pub url: String,
    #[serde(default)]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionEntry {
    pub id: String,
    #[serde(default)]
    pub downloads: HashMap<Platform, ArtifactDownload>,
}

/// Top-level manifest document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionManifest {
    #[serde(default)]
    pub stable: Vec<VersionEntry>,
    #[serde(default)]
    pub dev: Vec<VersionEntry>,
}

impl VersionManifest {
    pub fn channel(&self, channel: Channel) -> &[VersionEntry] {
        match channel {
            Channel::Stable => &self.stable,
            Channel::Dev => &self.dev,
        }
    }

    /// Version ids of a channel, newest first.
    pub fn ids(&self, channel: Channel) -> Vec<String> {
        self.channel(channel).iter().map(|v| v.id.clone()).collect()
    }

    /// Find a version in any channel, stable first.
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.stable
            .iter()
            .chain(self.dev.iter())
            .find(|v| v.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "stable": [
            {"id": "1.3.6", "downloads": {
                "windows": {"url": "https://example.com/1.3.6/ClassiCube.exe"},
                "linux": {"url": "https://example.com/1.3.6/ClassiCube", "sha256": "ab"}
            }},
            {"id": "1.3.5", "downloads": {}}
        ],
        "dev": [{"id": "dev-2024", "downloads": {"macos": {"url": "https://example.com/dev"}}}]
    }"#;

    #[test]
    fn deserialize_manifest() {
        let manifest: VersionManifest = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.ids(Channel::Stable), vec!["1.3.6", "1.3.5"]);
        assert_eq!(manifest.ids(Channel::Dev), vec!["dev-2024"]);

        let entry = manifest.find_version("1.3.6").unwrap();
        assert_eq!(
            entry.downloads[&Platform::Linux].sha256.as_deref(),
            Some("ab")
        );
        assert!(manifest.find_version("dev-2024").is_some());
        assert!(manifest.find_version("9.9.9").is_none());
    }

    #[test]
    fn channel_parsing() {
        assert_eq!("Stable".parse::<Channel>().unwrap(), Channel::Stable);
        assert_eq!("dev".parse::<Channel>().unwrap(), Channel::Dev);
        assert!("nightly".parse::<Channel>().is_err());
    }
}
