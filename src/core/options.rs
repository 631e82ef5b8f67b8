// ─── Options File ───
// Targeted edits of the game client's `options.txt` (one `key=value` per line).
// Unrelated lines are kept verbatim and in place; only the touched key changes.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::storage::write_atomic;

pub const OPTIONS_FILE: &str = "options.txt";

/// In-memory view of an options file, line by line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsFile {
    lines: Vec<String>,
    crlf: bool,
}

impl OptionsFile {
    pub fn parse(raw: &str) -> Self {
        Self {
            lines: raw.lines().map(str::to_string).collect(),
            crlf: raw.contains("\r\n"),
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(OPTIONS_FILE)
    }

    /// Load the options file of an instance directory.
    ///
    /// A missing file yields an empty set of options; a missing directory is an error.
    pub async fn load(dir: &Path) -> LauncherResult<Self> {
        ensure_dir(dir).await?;
        let path = Self::path_in(dir);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Self::parse(&raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(LauncherError::io(path, source)),
        }
    }

    pub async fn save(&self, dir: &Path) -> LauncherResult<()> {
        ensure_dir(dir).await?;
        write_atomic(&Self::path_in(dir), self.render().as_bytes()).await
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .find_map(|line| split_entry(line).filter(|(k, _)| *k == key).map(|(_, v)| v))
    }

    /// Upsert `key`. The first occurrence is rewritten in place, any later
    /// duplicates are dropped, and a new key is appended at the end.
    pub fn set(&mut self, key: &str, value: &str) {
        let entry = format!("{key}={}", single_line(value));
        let mut replaced = false;
        self.lines.retain_mut(|line| {
            if !matches!(split_entry(line), Some((k, _)) if k == key) {
                return true;
            }
            if replaced {
                return false;
            }
            *line = entry.clone();
            replaced = true;
            true
        });
        if !replaced {
            self.lines.push(entry);
        }
    }

    /// Remove every line for `key`. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.lines.len();
        self.lines
            .retain(|line| !matches!(split_entry(line), Some((k, _)) if k == key));
        before != self.lines.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| split_entry(line).map(|(k, _)| k))
    }

    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let newline = if self.crlf { "\r\n" } else { "\n" };
        let mut out = self.lines.join(newline);
        out.push_str(newline);
        out
    }
}

/// Set a single key in the instance's options file.
pub async fn set_option(dir: &Path, key: &str, value: &str) -> LauncherResult<()> {
    let mut options = OptionsFile::load(dir).await?;
    options.set(key, value);
    options.save(dir).await?;
    debug!("Set option {} in {:?}", key, dir);
    Ok(())
}

/// Delete a single key from the instance's options file. Absent keys are a no-op.
pub async fn delete_option(dir: &Path, key: &str) -> LauncherResult<()> {
    let mut options = OptionsFile::load(dir).await?;
    if options.remove(key) {
        options.save(dir).await?;
        debug!("Deleted option {} in {:?}", key, dir);
    }
    Ok(())
}

pub async fn get_option(dir: &Path, key: &str) -> LauncherResult<Option<String>> {
    Ok(OptionsFile::load(dir).await?.get(key).map(str::to_string))
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.starts_with('#') {
        return None;
    }
    Some((key, value))
}

// A value spanning lines would inject extra keys into the file.
fn single_line(value: &str) -> String {
    value.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

async fn ensure_dir(dir: &Path) -> LauncherResult<()> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(LauncherError::io(dir, std::io::Error::other("not a directory"))),
        Err(source) => Err(LauncherError::io(dir, source)),
    }
}
