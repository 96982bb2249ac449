//! Persistence client: keyed byte storage split into storage areas

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use wellness_core::storage::validate_key;
use wellness_core::{PersistenceError, StorageType};

use crate::sync::Locked;

#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Store `value` under `key`; `None` removes the key
    async fn set(
        &self,
        key: &str,
        value: Option<Vec<u8>>,
        storage: StorageType,
    ) -> Result<(), PersistenceError>;

    /// Read the value under `key`, `None` when absent
    async fn get(&self, key: &str, storage: StorageType)
        -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Remove `key`; removing an absent key succeeds
    async fn remove(&self, key: &str, storage: StorageType) -> Result<(), PersistenceError>;

    /// Remove every key in `storage`
    async fn clear(&self, storage: StorageType) -> Result<(), PersistenceError>;
}

// ── JSON helpers ────────────────────────────────────────────────────────────

/// Encode `value` as JSON under `key`; `None` removes the key
pub async fn set_json<T: Serialize + Sync>(
    client: &dyn PersistenceClient,
    key: &str,
    value: Option<&T>,
    storage: StorageType,
) -> Result<(), PersistenceError> {
    let Some(value) = value else {
        return client.remove(key, storage).await;
    };
    let bytes = serde_json::to_vec(value).map_err(|_| PersistenceError::EncodingError)?;
    client.set(key, Some(bytes), storage).await
}

/// Decode the JSON value under `key`, `None` when absent
pub async fn get_json<T: DeserializeOwned>(
    client: &dyn PersistenceClient,
    key: &str,
    storage: StorageType,
) -> Result<Option<T>, PersistenceError> {
    match client.get(key, storage).await? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|_| PersistenceError::DecodingError),
        None => Ok(None),
    }
}

// ── Live ────────────────────────────────────────────────────────────────────

/// One directory per storage area under `root`, one file per key.
///
/// Writes go through a temp file and a rename, so a concurrent `get` never
/// observes a partially written value.
#[derive(Debug, Clone)]
pub struct FilePersistenceClient {
    root: PathBuf,
}

impl FilePersistenceClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn area(&self, storage: StorageType) -> PathBuf {
        self.root.join(storage.dir_name())
    }

    fn path(&self, key: &str, storage: StorageType) -> Result<PathBuf, PersistenceError> {
        validate_key(key)?;
        Ok(self.area(storage).join(key))
    }

    async fn blocking<T, F>(f: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, PersistenceError> + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| PersistenceError::UnknownError(e.to_string()))?
    }
}

/// Replace `path` with `bytes` so readers see either the old or the new value.
///
/// Writers serialize on an `fs2` lock over a `.<key>.lock` sidecar, then
/// write a synced temp file beside the target and rename it into place.
/// Keys never start with a dot, so sidecars cannot collide with values.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return Err(PersistenceError::StorageError(format!(
            "invalid storage path: {}",
            path.display()
        )));
    };
    std::fs::create_dir_all(dir)?;
    let name = name.to_string_lossy();

    let lock = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(dir.join(format!(".{name}.lock")))?;
    lock.lock_exclusive()?;

    let temp = dir.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple()));
    let written = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&temp, path)
    })();

    if written.is_err() {
        let _ = std::fs::remove_file(&temp);
    }
    let _ = FileExt::unlock(&lock);
    written.map_err(PersistenceError::from)
}

fn remove_if_present(path: &Path) -> Result<(), PersistenceError> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

#[async_trait]
impl PersistenceClient for FilePersistenceClient {
    async fn set(
        &self,
        key: &str,
        value: Option<Vec<u8>>,
        storage: StorageType,
    ) -> Result<(), PersistenceError> {
        let path = self.path(key, storage)?;
        tracing::trace!("persist {} ({})", key, storage);
        Self::blocking(move || match value {
            Some(bytes) => write_atomic(&path, &bytes),
            None => remove_if_present(&path),
        })
        .await
    }

    async fn get(
        &self,
        key: &str,
        storage: StorageType,
    ) -> Result<Option<Vec<u8>>, PersistenceError> {
        let path = self.path(key, storage)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, key: &str, storage: StorageType) -> Result<(), PersistenceError> {
        let path = self.path(key, storage)?;
        Self::blocking(move || remove_if_present(&path)).await
    }

    async fn clear(&self, storage: StorageType) -> Result<(), PersistenceError> {
        let area = self.area(storage);
        tracing::debug!("Clearing {} storage at {}", storage, area.display());
        match tokio::fs::remove_dir_all(&area).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// ── Mock ────────────────────────────────────────────────────────────────────

/// In-memory store keyed by storage area and key
#[derive(Debug, Default)]
pub struct MockPersistenceClient {
    items: Locked<HashMap<(StorageType, String), Vec<u8>>>,
    writes: Locked<usize>,
}

impl MockPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls that stored a value
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn contains(&self, key: &str, storage: StorageType) -> bool {
        self.items
            .with(|items| items.contains_key(&(storage, key.to_string())))
    }
}

#[async_trait]
impl PersistenceClient for MockPersistenceClient {
    async fn set(
        &self,
        key: &str,
        value: Option<Vec<u8>>,
        storage: StorageType,
    ) -> Result<(), PersistenceError> {
        let slot = (storage, key.to_string());
        match value {
            Some(bytes) => {
                self.items.with(|items| items.insert(slot, bytes));
                self.writes.with(|w| *w += 1);
            }
            None => {
                self.items.with(|items| items.remove(&slot));
            }
        }
        Ok(())
    }

    async fn get(
        &self,
        key: &str,
        storage: StorageType,
    ) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self
            .items
            .with(|items| items.get(&(storage, key.to_string())).cloned()))
    }

    async fn remove(&self, key: &str, storage: StorageType) -> Result<(), PersistenceError> {
        self.items
            .with(|items| items.remove(&(storage, key.to_string())));
        Ok(())
    }

    async fn clear(&self, storage: StorageType) -> Result<(), PersistenceError> {
        self.items.with(|items| items.retain(|(area, _), _| *area != storage));
        Ok(())
    }
}
