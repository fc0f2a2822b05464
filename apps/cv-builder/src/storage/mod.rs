//! Key-value persistence for autosaves and named drafts.
//!
//! Two backends: `FileStorage` (one JSON file per key, used by the server) and
//! `MemoryStorage` (tests, ephemeral runs).

pub mod autosave;
pub mod drafts;
pub mod handlers;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

pub use drafts::{DraftManager, DraftSummary, StorageUsage};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("Draft {0} not found")]
    DraftNotFound(Uuid),

    #[error("Draft name must not be empty")]
    EmptyName,

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Returns whether the key existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;

    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

// ────────────────────────────────────────────────────────────────────────────
// File storage
// ────────────────────────────────────────────────────────────────────────────

const FILE_EXTENSION: &str = "json";

pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Creates the directory if needed.
    pub async fn open(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

#[async_trait]
impl StorageBackend for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        // Atomic replace: write a sibling temp file, then rename over the key. Each
        // write gets its own temp name so concurrent writers never share one.
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = tokio::fs::write(&tmp, value).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.base_path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory storage
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStorage::open(temp_dir.path().join("drafts")).await.unwrap();

        assert_eq!(store.get("cv_autosave_autosave").await.unwrap(), None);
        store.set("cv_autosave_autosave", "{\"a\":1}").await.unwrap();
        assert_eq!(
            store.get("cv_autosave_autosave").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert_eq!(store.keys().await.unwrap(), vec!["cv_autosave_autosave"]);

        assert!(store.remove("cv_autosave_autosave").await.unwrap());
        assert!(!store.remove("cv_autosave_autosave").await.unwrap());
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_one_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileStorage::open(temp_dir.path()).await.unwrap());

        let mut writers = tokio::task::JoinSet::new();
        for i in 0..16 {
            let store = store.clone();
            writers.spawn(async move {
                store
                    .set("cv_autosave_autosave", &format!("{{\"n\":{i}}}"))
                    .await
            });
        }
        while let Some(result) = writers.join_next().await {
            result.unwrap().unwrap();
        }

        let value = store.get("cv_autosave_autosave").await.unwrap().unwrap();
        let n: serde_json::Value = serde_json::from_str(&value).unwrap();
        assert!(n["n"].as_u64().unwrap() < 16);
        assert_eq!(store.keys().await.unwrap(), vec!["cv_autosave_autosave"]);
        let leftovers = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn test_file_storage_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStorage::open(temp_dir.path()).await.unwrap();
        assert!(matches!(
            store.set("../escape", "x").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let store = MemoryStorage::new();
        store.set("b", "2").await.unwrap();
        store.set("a", "1").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
        assert!(store.remove("a").await.unwrap());
        assert_eq!(store.get("a").await.unwrap(), None);
    }
}
