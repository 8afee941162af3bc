use crate::config::StorageMode;
use crate::errors::StoreError;
use std::{
    collections::HashMap,
    future::Future,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::{info, warn};

/// String key-value persistence used by [`crate::store::EntryStore`].
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Persists each key as `<dir>/<key>.json`, replaced whole through a
/// `<key>.json.tmp` sibling so a torn write never clobbers the last good blob.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json.tmp"))
    }
}

impl KeyValueBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let temp = self.temp_path_for(key);
        fs::write(&temp, value).await?;
        if let Err(err) = fs::rename(&temp, self.path_for(key)).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err.into());
        }
        Ok(())
    }
}

/// Non-persistent fallback; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// The backend picked at startup. Chosen once and never swapped.
#[derive(Debug)]
pub enum Backend {
    File(FileBackend),
    Memory(MemoryBackend),
}

impl Backend {
    /// File store under `dir` unless memory was requested; falls back to
    /// memory when the directory cannot be created.
    pub async fn select(mode: StorageMode, dir: &Path) -> Self {
        if mode == StorageMode::Memory {
            info!("memory storage requested, entries will not persist");
            return Backend::Memory(MemoryBackend::default());
        }

        match fs::create_dir_all(dir).await {
            Ok(()) => {
                info!("storing entries under {}", dir.display());
                Backend::File(FileBackend::new(dir))
            }
            Err(err) => {
                warn!("data directory {} unusable ({err}), entries will not persist", dir.display());
                Backend::Memory(MemoryBackend::default())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Backend::File(_))
    }
}

impl KeyValueBackend for Backend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Backend::File(backend) => backend.get(key).await,
            Backend::Memory(backend) => backend.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        match self {
            Backend::File(backend) => backend.set(key, value).await,
            Backend::Memory(backend) => backend.set(key, value).await,
        }
    }
}
