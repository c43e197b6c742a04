use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Profile,
    Preferences,
    Matches,
    Conversations,
    ModelSettings,
}

impl StorageKey {
    pub fn name(self) -> &'static str {
        match self {
            StorageKey::Profile => "datingProfile",
            StorageKey::Preferences => "datingPreferences",
            StorageKey::Matches => "datingMatches",
            StorageKey::Conversations => "datingConversations",
            StorageKey::ModelSettings => "modelSettings",
        }
    }
}

/// JSON blobs under fixed keys, one file each. Every write replaces the whole blob.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.name()))
    }

    pub fn exists(&self, key: StorageKey) -> bool {
        self.path(key).exists()
    }

    /// Missing blobs are `None`; malformed blobs are an error.
    pub fn load_optional<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stored {}", key.name()))?;
        Ok(Some(value))
    }

    pub fn load<T: DeserializeOwned + Default>(&self, key: StorageKey) -> Result<T> {
        Ok(self.load_optional(key)?.unwrap_or_default())
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        let path = self.path(key);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Saved {}", key.name());
        Ok(())
    }

    /// Deletes the blob; a blob that is already gone is not an error.
    pub fn remove(&self, key: StorageKey) -> Result<()> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
